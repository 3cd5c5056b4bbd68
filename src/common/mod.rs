pub mod column;
pub mod config;
pub mod record_batch;
pub mod schema;
pub mod types;
pub mod utils;
