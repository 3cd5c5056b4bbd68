use super::utils::canonicalize;
use crate::common::schema::Schema;
use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Hash, Eq, Ord, PartialOrd, PartialEq)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: canonicalize(name.as_ref()),
        }
    }

    pub fn flat_name(&self) -> String {
        self.name.clone()
    }

    /// position of this column in the schema
    pub fn index_in(&self, schema: &Schema) -> Result<usize> {
        schema
            .index_of(&self.name)
            .ok_or_else(|| anyhow!("failed to find field {self}"))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.flat_name())
    }
}

impl From<String> for Column {
    fn from(c: String) -> Self {
        Self::new(c)
    }
}
impl From<&String> for Column {
    fn from(c: &String) -> Self {
        Self::new(c)
    }
}

impl From<&str> for Column {
    fn from(c: &str) -> Self {
        Self::new(c)
    }
}
