//! Loosely typed arguments of the na functions and their normalization.
//!
//! Callers hand over strings, numbers, lists and maps in whatever shape is
//! convenient. Everything is checked here before a single expression is
//! built, so the rewrite itself only ever sees well formed literals.

use crate::common::schema::Schema;
use crate::common::types::DataValue;
use crate::error::NaError;
use crate::na::value::LiteralValue;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Scalar(DataValue),
    List(Vec<ArgValue>),
    /// ordered key/value pairs
    Map(Vec<(ArgValue, ArgValue)>),
}

impl ArgValue {
    /// build a map argument, pairs keep the given order
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<ArgValue>,
        V: Into<ArgValue>,
    {
        ArgValue::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn null() -> Self {
        ArgValue::Scalar(DataValue::Null)
    }

    fn describe(&self) -> String {
        match self {
            ArgValue::Scalar(v) => format!("{v:?}"),
            ArgValue::List(items) => format!("list of {} items", items.len()),
            ArgValue::Map(pairs) => format!("map of {} entries", pairs.len()),
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Scalar(DataValue::Utf8(Some(s))) => Some(s),
            _ => None,
        }
    }

    /// the literal this argument stands for, nested lists and maps are rejected
    pub fn to_literal(&self) -> Result<LiteralValue> {
        let invalid = || -> anyhow::Error {
            NaError::InvalidArgumentValue(format!(
                "{} is not one of the accepted literal types",
                self.describe()
            ))
            .into()
        };
        let value = match self {
            ArgValue::Scalar(v) => v,
            _ => return Err(invalid()),
        };
        if value.is_null() {
            return Ok(LiteralValue::Null);
        }
        let literal = match value {
            DataValue::Boolean(Some(v)) => LiteralValue::Boolean(*v),
            DataValue::Float32(Some(v)) => LiteralValue::Float(*v as f64),
            DataValue::Float64(Some(v)) => LiteralValue::Float(*v),
            DataValue::Int8(Some(v)) => LiteralValue::Int(*v as i64),
            DataValue::Int16(Some(v)) => LiteralValue::Int(*v as i64),
            DataValue::Int32(Some(v)) => LiteralValue::Int(*v as i64),
            DataValue::Int64(Some(v)) => LiteralValue::Int(*v),
            DataValue::UInt64(Some(v)) => {
                LiteralValue::Int(i64::try_from(*v).map_err(|_| invalid())?)
            }
            DataValue::Utf8(Some(v)) => LiteralValue::Utf8(v.clone()),
            DataValue::Binary(Some(v)) => LiteralValue::Binary(v.clone()),
            DataValue::Date32(Some(days)) => LiteralValue::Date(
                NaiveDate::default()
                    .checked_add_signed(chrono::Duration::days(*days as i64))
                    .ok_or_else(invalid)?,
            ),
            DataValue::Time64Microsecond(Some(micros)) => {
                let secs = u32::try_from(micros.div_euclid(1_000_000)).map_err(|_| invalid())?;
                let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
                LiteralValue::Time(
                    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                        .ok_or_else(invalid)?,
                )
            }
            DataValue::Timestamp(Some(micros)) => LiteralValue::Timestamp(
                DateTime::<Utc>::from_timestamp_micros(*micros)
                    .ok_or_else(invalid)?
                    .naive_utc(),
            ),
            _ => return Err(invalid()),
        };
        Ok(literal)
    }
}

impl From<DataValue> for ArgValue {
    fn from(v: DataValue) -> Self {
        ArgValue::Scalar(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Scalar(DataValue::Utf8(Some(v.to_string())))
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Scalar(DataValue::Utf8(Some(v)))
    }
}

impl From<&String> for ArgValue {
    fn from(v: &String) -> Self {
        ArgValue::Scalar(DataValue::Utf8(Some(v.clone())))
    }
}

impl From<&[u8]> for ArgValue {
    fn from(v: &[u8]) -> Self {
        ArgValue::Scalar(DataValue::Binary(Some(v.to_vec())))
    }
}

macro_rules! arg_from {
    ($t:ty, $variant:ident, $as:ty) => {
        impl From<$t> for ArgValue {
            fn from(v: $t) -> Self {
                ArgValue::Scalar(DataValue::$variant(Some(v as $as)))
            }
        }
    };
}

arg_from!(bool, Boolean, bool);
arg_from!(i8, Int8, i8);
arg_from!(i16, Int16, i16);
arg_from!(i32, Int32, i32);
arg_from!(i64, Int64, i64);
arg_from!(u16, Int64, i64);
arg_from!(u32, Int64, i64);
arg_from!(u64, UInt64, u64);
arg_from!(f32, Float32, f32);
arg_from!(f64, Float64, f64);

impl From<NaiveDate> for ArgValue {
    fn from(v: NaiveDate) -> Self {
        ArgValue::Scalar(LiteralValue::Date(v).to_data_value())
    }
}

impl From<NaiveTime> for ArgValue {
    fn from(v: NaiveTime) -> Self {
        ArgValue::Scalar(LiteralValue::Time(v).to_data_value())
    }
}

impl From<NaiveDateTime> for ArgValue {
    fn from(v: NaiveDateTime) -> Self {
        ArgValue::Scalar(LiteralValue::Timestamp(v).to_data_value())
    }
}

impl From<LiteralValue> for ArgValue {
    fn from(v: LiteralValue) -> Self {
        ArgValue::Scalar(v.to_data_value())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(ArgValue::null, Into::into)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(v: Vec<T>) -> Self {
        ArgValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ArgValue>, const N: usize> From<[T; N]> for ArgValue {
    fn from(v: [T; N]) -> Self {
        ArgValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// requested column names, in the order given; no subset means every column
pub fn normalize_subset(subset: Option<&ArgValue>, schema: &Schema) -> Result<Vec<String>> {
    let shape_error = || -> anyhow::Error {
        NaError::InvalidArgumentShape("subset should be a list or tuple of column names".into())
            .into()
    };
    match subset {
        None => Ok(schema.column_names()),
        Some(ArgValue::Scalar(DataValue::Utf8(Some(name)))) => Ok(vec![name.clone()]),
        Some(ArgValue::List(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(shape_error))
            .collect(),
        Some(_) => Err(shape_error()),
    }
}

/// column name to fill value pairs. a scalar applies to every subset column,
/// a map ignores the subset
pub fn fill_values(value: &ArgValue, subset: &[String]) -> Result<Vec<(String, LiteralValue)>> {
    match value {
        ArgValue::Map(pairs) => {
            let names = pairs
                .iter()
                .map(|(k, _)| {
                    k.as_str().map(str::to_string).ok_or_else(|| {
                        NaError::InvalidArgumentValue(
                            "all keys in value should be column names (str)".into(),
                        )
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let values = pairs
                .iter()
                .map(|(_, v)| v.to_literal())
                .collect::<Result<Vec<_>>>()?;
            Ok(names.into_iter().zip(values).collect())
        }
        ArgValue::List(_) => Err(NaError::InvalidArgumentValue(
            "value should be a scalar or a map from column name to value".into(),
        )
        .into()),
        ArgValue::Scalar(_) => {
            let literal = value.to_literal()?;
            Ok(subset
                .iter()
                .map(|name| (name.clone(), literal.clone()))
                .collect())
        }
    }
}

/// ordered match to replacement pairs. inserting an existing key overwrites
/// its replacement and keeps its position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementMap {
    entries: Vec<(LiteralValue, LiteralValue)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: LiteralValue, value: LiteralValue) {
        match self.entries.iter_mut().find(|(k, _)| k.same_key(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(LiteralValue, LiteralValue)> {
        self.entries.iter()
    }
}

impl FromIterator<(LiteralValue, LiteralValue)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (LiteralValue, LiteralValue)>>(iter: I) -> Self {
        let mut map = ReplacementMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// pair up `to_replace` and `value` in the shapes replace accepts
pub fn replacement_map(to_replace: &ArgValue, value: Option<&ArgValue>) -> Result<ReplacementMap> {
    let pairs: Vec<(&ArgValue, Option<&ArgValue>)> = match (to_replace, value) {
        (ArgValue::Map(pairs), _) => pairs.iter().map(|(k, v)| (k, Some(v))).collect(),
        (ArgValue::List(keys), Some(ArgValue::List(values))) => {
            if keys.len() != values.len() {
                return Err(NaError::LengthMismatch(keys.len(), values.len()).into());
            }
            keys.iter().zip(values.iter().map(Some)).collect()
        }
        (ArgValue::List(keys), value) => keys.iter().map(|k| (k, value)).collect(),
        (key, value) => vec![(key, value)],
    };
    pairs
        .into_iter()
        .map(|(k, v)| {
            let value = match v {
                Some(v) => v.to_literal()?,
                None => LiteralValue::Null,
            };
            Ok((k.to_literal()?, value))
        })
        .collect()
}
