pub mod export;
pub mod history;
pub mod import;
