use crate::common::record_batch::RecordBatch;
use crate::common::schema::SchemaRef;
use crate::common::types::{DataType, DataValue};
use crate::storage::Table;
use anyhow::{anyhow, Result};

#[derive(Debug)]
pub struct MemTable {
    schema: SchemaRef,
    rows: Vec<Vec<DataValue>>,
}

impl MemTable {
    /// every value must be null or match the declared type of its field
    pub fn try_new(schema: SchemaRef, rows: Vec<Vec<DataValue>>) -> Result<Self> {
        let batch = RecordBatch::try_new(schema.clone(), rows)?;
        for (i, row) in batch.rows.iter().enumerate() {
            for (value, field) in row.iter().zip(schema.fields().iter()) {
                let value_type = value.get_datatype();
                if value_type != *field.data_type() && value_type != DataType::Null {
                    return Err(anyhow!(
                        "row {} value {:?} does not match type {} of field {}",
                        i,
                        value,
                        field.data_type(),
                        field.name()
                    ));
                }
            }
        }
        Ok(Self {
            schema,
            rows: batch.rows,
        })
    }
}

impl Table for MemTable {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
    fn scan(&self, max_rows: usize) -> Result<RecordBatch> {
        RecordBatch::try_new(
            self.schema.clone(),
            self.rows.iter().take(max_rows).cloned().collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::schema::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_memtable() -> Result<()> {
        let schema = Arc::new(Schema::try_new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
        ])?);
        let rows = vec![
            vec![DataValue::Int64(Some(1)), DataValue::Utf8(Some("John".into()))],
            vec![DataValue::Int64(Some(2)), DataValue::Null],
        ];
        let table = MemTable::try_new(schema.clone(), rows)?;
        assert_eq!(table.scan(10)?.num_rows(), 2);
        assert_eq!(table.scan(1)?.num_rows(), 1);
        let bad = MemTable::try_new(schema, vec![vec![DataValue::Utf8(None), DataValue::Null]]);
        assert!(bad.is_err());
        Ok(())
    }
}
