pub mod memory;

use crate::common::record_batch::RecordBatch;
use crate::common::schema::SchemaRef;
use anyhow::Result;

/// a data source a logical plan can scan
pub trait Table: Send + Sync {
    fn schema(&self) -> SchemaRef;
    /// read at most `max_rows` rows
    fn scan(&self, max_rows: usize) -> Result<RecordBatch>;
}
