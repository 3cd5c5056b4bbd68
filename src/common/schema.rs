use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::ops::Deref;
use std::sync::Arc;

use crate::common::types::DataType;
use crate::common::utils::canonicalize;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Field {
    name: String,
    data_type: DataType,
    nullable: bool,
}

impl Field {
    /// the name is stored in its canonical form
    pub fn new(name: impl AsRef<str>, data_type: DataType, nullable: bool) -> Self {
        Field {
            name: canonicalize(name.as_ref()),
            data_type,
            nullable,
        }
    }
    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

pub type FieldRef = Arc<Field>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fields(Arc<[FieldRef]>);

impl Fields {
    /// find a field by name, the name is canonicalized before lookup
    pub fn find(&self, name: &str) -> Option<(usize, &FieldRef)> {
        let name = canonicalize(name);
        self.0.iter().enumerate().find(|(_, f)| *f.name() == name)
    }
    pub fn empty() -> Self {
        Self(Arc::new([]))
    }
}

impl From<Vec<FieldRef>> for Fields {
    fn from(value: Vec<FieldRef>) -> Self {
        Self(value.into())
    }
}

impl From<Vec<Field>> for Fields {
    fn from(value: Vec<Field>) -> Self {
        value.into_iter().collect()
    }
}
impl FromIterator<Field> for Fields {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        iter.into_iter().map(Arc::new).collect()
    }
}
impl FromIterator<FieldRef> for Fields {
    fn from_iter<T: IntoIterator<Item = FieldRef>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for Fields {
    type Target = [FieldRef];
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Fields,
    metadata: HashMap<String, String>,
}

pub type SchemaRef = Arc<Schema>;

/// metadata maps are not part of the hash
impl std::hash::Hash for Schema {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

impl Schema {
    pub fn try_new(fields: impl Into<Fields>) -> Result<Self> {
        Self::new_with_metadata(fields, HashMap::new())
    }

    /// field names must be unique after canonicalization
    pub fn new_with_metadata(
        fields: impl Into<Fields>,
        metadata: HashMap<String, String>,
    ) -> Result<Self> {
        let fields = fields.into();
        let mut seen = HashSet::new();
        for field in fields.iter() {
            if !seen.insert(field.name()) {
                return Err(anyhow!(
                    "schema contains duplicate field name {}",
                    field.name()
                ));
            }
        }
        Ok(Self { fields, metadata })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.find(name).map(|(i, _)| i)
    }

    /// column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().clone()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn test_field_equal() {
        let f1 = Field::new("name_a", DataType::Binary, false);
        let f2 = Field::new("NAME_A", DataType::Binary, false);
        let f3 = Field::new("name_b", DataType::Binary, false);
        let f4 = Field::new("name_b", DataType::Binary, true);
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
        assert_ne!(f3, f4);
        assert_eq!(f1.name(), "\"name_a\"");
    }

    #[test]
    fn test_schema_lookup() -> Result<()> {
        let schema = Schema::try_new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("\"Mixed\"", DataType::Utf8, true),
        ])?;
        assert_eq!(schema.index_of("ID"), Some(0));
        assert_eq!(schema.index_of("\"id\""), Some(0));
        assert_eq!(schema.index_of("\"Mixed\""), Some(1));
        assert_eq!(schema.index_of("mixed"), None);
        assert_eq!(
            schema.column_names(),
            vec!["\"id\"".to_string(), "\"Mixed\"".to_string()]
        );
        Ok(())
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let schema = Schema::try_new(vec![
            Field::new("a", DataType::Int64, false),
            Field::new("A", DataType::Int32, false),
        ]);
        assert!(schema.is_err());
    }
}
