use crate::common::schema::SchemaRef;
use crate::common::types::DataValue;
use anyhow::{anyhow, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordBatch {
    pub schema: SchemaRef,
    pub rows: Vec<Vec<DataValue>>,
}

impl RecordBatch {
    /// every row must have one value per schema field
    pub fn try_new(schema: SchemaRef, rows: Vec<Vec<DataValue>>) -> Result<Self> {
        let width = schema.fields().len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(anyhow!(
                "row {} has {} values, schema has {} fields",
                i,
                row.len(),
                width
            ));
        }
        Ok(Self { schema, rows })
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// all values of one column, by name
    pub fn column(&self, name: &str) -> Result<Vec<DataValue>> {
        let idx = self
            .schema
            .index_of(name)
            .ok_or_else(|| anyhow!("no column {name} in record batch"))?;
        Ok(self.rows.iter().map(|r| r[idx].clone()).collect())
    }
}

impl std::fmt::Display for RecordBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = self
            .schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(f, "{header}")?;
        for row in &self.rows {
            let line = row
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
