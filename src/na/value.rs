use crate::common::types::{DataType, DataValue};
use crate::expr::expr::Expr;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// a literal the na functions accept as a fill value or replacement key/value
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Int(i64),
    Float(f64),
    Boolean(bool),
    Utf8(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl LiteralValue {
    /// the column type this literal would have on its own
    pub fn natural_type(&self) -> DataType {
        match self {
            LiteralValue::Null => DataType::Null,
            LiteralValue::Int(_) => DataType::Int64,
            LiteralValue::Float(_) => DataType::Float64,
            LiteralValue::Boolean(_) => DataType::Boolean,
            LiteralValue::Utf8(_) => DataType::Utf8,
            LiteralValue::Binary(_) => DataType::Binary,
            LiteralValue::Date(_) => DataType::Date32,
            LiteralValue::Time(_) => DataType::Time64Microsecond,
            LiteralValue::Timestamp(_) => DataType::Timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Boolean(_) => "bool",
            LiteralValue::Utf8(_) => "str",
            LiteralValue::Binary(_) => "bytes",
            LiteralValue::Date(_) => "date",
            LiteralValue::Time(_) => "time",
            LiteralValue::Timestamp(_) => "datetime",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    /// same kind and same value, floats by bit pattern
    pub(crate) fn same_key(&self, other: &LiteralValue) -> bool {
        match (self, other) {
            (LiteralValue::Float(a), LiteralValue::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    pub fn to_data_value(&self) -> DataValue {
        match self {
            LiteralValue::Null => DataValue::Null,
            LiteralValue::Int(v) => DataValue::Int64(Some(*v)),
            LiteralValue::Float(v) => DataValue::Float64(Some(*v)),
            LiteralValue::Boolean(v) => DataValue::Boolean(Some(*v)),
            LiteralValue::Utf8(v) => DataValue::Utf8(Some(v.clone())),
            LiteralValue::Binary(v) => DataValue::Binary(Some(v.clone())),
            LiteralValue::Date(d) => {
                let days = d.signed_duration_since(NaiveDate::default()).num_days();
                DataValue::Date32(i32::try_from(days).ok())
            }
            LiteralValue::Time(t) => DataValue::Time64Microsecond(Some(
                t.num_seconds_from_midnight() as i64 * 1_000_000 + (t.nanosecond() / 1_000) as i64,
            )),
            LiteralValue::Timestamp(ts) => DataValue::Timestamp(Some(ts.and_utc().timestamp_micros())),
        }
    }

    pub fn lit(&self) -> Expr {
        Expr::Literal(self.to_data_value())
    }
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::Null => write!(f, "None"),
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Float(v) => write!(f, "{v:?}"),
            LiteralValue::Boolean(v) => write!(f, "{v}"),
            LiteralValue::Utf8(v) => write!(f, "{v}"),
            LiteralValue::Binary(v) => write!(f, "{v:?}"),
            LiteralValue::Date(v) => write!(f, "{v}"),
            LiteralValue::Time(v) => write!(f, "{v}"),
            LiteralValue::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

/// whether `value` may be written into a column declared as `data_type`
pub fn compatible(value: &LiteralValue, data_type: &DataType) -> bool {
    match value {
        LiteralValue::Null => true,
        LiteralValue::Int(_) => matches!(
            data_type,
            DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
        ),
        LiteralValue::Float(_) => data_type.is_float(),
        other => other.natural_type() == *data_type,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL_TYPES: [DataType; 14] = [
        DataType::Null,
        DataType::Boolean,
        DataType::Float32,
        DataType::Float64,
        DataType::Int8,
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::UInt64,
        DataType::Utf8,
        DataType::Binary,
        DataType::Date32,
        DataType::Time64Microsecond,
        DataType::Timestamp,
    ];

    fn accepted(value: LiteralValue) -> Vec<DataType> {
        ALL_TYPES
            .iter()
            .filter(|t| compatible(&value, t))
            .copied()
            .collect()
    }

    #[test]
    fn test_compatible_every_kind() {
        assert_eq!(accepted(LiteralValue::Null), ALL_TYPES.to_vec());
        assert_eq!(
            accepted(LiteralValue::Int(1)),
            vec![
                DataType::Float32,
                DataType::Float64,
                DataType::Int32,
                DataType::Int64
            ]
        );
        assert_eq!(
            accepted(LiteralValue::Float(1.5)),
            vec![DataType::Float32, DataType::Float64]
        );
        assert_eq!(accepted(LiteralValue::Boolean(true)), vec![DataType::Boolean]);
        assert_eq!(accepted(LiteralValue::Utf8("a".into())), vec![DataType::Utf8]);
        assert_eq!(accepted(LiteralValue::Binary(vec![1])), vec![DataType::Binary]);
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(accepted(LiteralValue::Date(date)), vec![DataType::Date32]);
        let time = NaiveTime::from_hms_opt(1, 2, 3).unwrap();
        assert_eq!(
            accepted(LiteralValue::Time(time)),
            vec![DataType::Time64Microsecond]
        );
        assert_eq!(
            accepted(LiteralValue::Timestamp(date.and_time(time))),
            vec![DataType::Timestamp]
        );
    }

    #[test]
    fn test_to_data_value() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        assert_eq!(LiteralValue::Date(date).to_data_value(), DataValue::Date32(Some(10)));
        let time = NaiveTime::from_hms_micro_opt(0, 0, 1, 5).unwrap();
        assert_eq!(
            LiteralValue::Time(time).to_data_value(),
            DataValue::Time64Microsecond(Some(1_000_005))
        );
        let ts = NaiveDate::from_ymd_opt(1970, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            LiteralValue::Timestamp(ts).to_data_value(),
            DataValue::Timestamp(Some(86_400_000_000))
        );
        assert_eq!(LiteralValue::Null.to_data_value(), DataValue::Null);
    }

    #[test]
    fn test_same_key_distinguishes_kinds() {
        assert!(!LiteralValue::Int(1).same_key(&LiteralValue::Float(1.0)));
        assert!(LiteralValue::Float(f64::NAN).same_key(&LiteralValue::Float(f64::NAN)));
        assert!(LiteralValue::Utf8("a".into()).same_key(&LiteralValue::Utf8("a".into())));
    }
}
