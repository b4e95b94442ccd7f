pub mod audio;
pub mod cli;
pub mod commands;
pub mod cycle;
pub mod dimension;
pub mod error;
pub mod prompt;
pub mod render;
pub mod storage;
pub mod trend;
pub mod tui;
pub mod window;

pub use error::{Error, Result};
