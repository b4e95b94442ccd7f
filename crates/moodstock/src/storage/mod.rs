mod schema;
pub mod store;

pub use schema::{TABLE, columns};
pub use store::{Sample, SampleStore, timestamp_now};
