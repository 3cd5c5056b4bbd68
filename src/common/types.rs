use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[derive(Clone)]
pub enum DataValue {
    Null,
    Boolean(Option<bool>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt64(Option<u64>),
    Utf8(Option<String>),
    Binary(Option<Vec<u8>>),
    /// Date stored as a signed 32bit int days since UNIX epoch 1970-01-01
    Date32(Option<i32>),
    /// Time stored as a signed 64bit int as microseconds since midnight
    Time64Microsecond(Option<i64>),
    /// Timestamp without time zone, microseconds since UNIX epoch
    Timestamp(Option<i64>),
}

/// floats are compared by their bit pattern, so a NaN literal equals itself
/// and the expression trees holding it can be compared and hashed.
impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        use DataValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Float32(a), Float32(b)) => a.map(f32::to_bits) == b.map(f32::to_bits),
            (Float64(a), Float64(b)) => a.map(f64::to_bits) == b.map(f64::to_bits),
            (Int8(a), Int8(b)) => a == b,
            (Int16(a), Int16(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (UInt64(a), UInt64(b)) => a == b,
            (Utf8(a), Utf8(b)) => a == b,
            (Binary(a), Binary(b)) => a == b,
            (Date32(a), Date32(b)) => a == b,
            (Time64Microsecond(a), Time64Microsecond(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

macro_rules! format_option {
    ($F: expr, $EXPR: expr) => {
        match $EXPR {
            Some(e) => write!($F, "{e}"),
            None => write!($F, "NULL"),
        }
    };
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Boolean(e) => format_option!(f, e),
            DataValue::Float32(e) => format_option!(f, e),
            DataValue::Float64(e) => format_option!(f, e),
            DataValue::Int8(e) => format_option!(f, e),
            DataValue::Int16(e) => format_option!(f, e),
            DataValue::Int32(e) => format_option!(f, e),
            DataValue::Int64(e) => format_option!(f, e),
            DataValue::UInt64(e) => format_option!(f, e),
            DataValue::Utf8(e) => format_option!(f, e),
            DataValue::Binary(e) => match e {
                Some(l) => write!(
                    f,
                    "{}",
                    l.iter().map(|v| format!("{v}")).collect::<Vec<_>>().join(",")
                ),
                None => write!(f, "NULL"),
            },
            DataValue::Date32(e) => match e.and_then(date32_to_date) {
                Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
                None => format_option!(f, e),
            },
            DataValue::Time64Microsecond(e) => match e.and_then(micros_to_time) {
                Some(t) => write!(f, "{}", t.format("%H:%M:%S%.6f")),
                None => format_option!(f, e),
            },
            DataValue::Timestamp(e) => match e.and_then(DateTime::<Utc>::from_timestamp_micros) {
                Some(ts) => write!(f, "{}", ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f")),
                None => format_option!(f, e),
            },
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Boolean(_) => write!(f, "Boolean({self})"),
            DataValue::Float32(_) => write!(f, "Float32({self})"),
            DataValue::Float64(_) => write!(f, "Float64({self})"),
            DataValue::Int8(_) => write!(f, "Int8({self})"),
            DataValue::Int16(_) => write!(f, "Int16({self})"),
            DataValue::Int32(_) => write!(f, "Int32({self})"),
            DataValue::Int64(_) => write!(f, "Int64({self})"),
            DataValue::UInt64(_) => write!(f, "UInt64({self})"),
            DataValue::Utf8(e) => match e {
                Some(_) => write!(f, "Utf8(\"{self}\")"),
                None => write!(f, "Utf8({self})"),
            },
            DataValue::Binary(_) => write!(f, "Binary(\"{self}\")"),
            DataValue::Date32(_) => write!(f, "Date32(\"{self}\")"),
            DataValue::Time64Microsecond(_) => write!(f, "Time64Microsecond(\"{self}\")"),
            DataValue::Timestamp(_) => write!(f, "Timestamp(\"{self}\")"),
        }
    }
}

fn date32_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(chrono::Duration::days(days as i64))
}

fn micros_to_time(micros: i64) -> Option<NaiveTime> {
    let secs = u32::try_from(micros.div_euclid(1_000_000)).ok()?;
    let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DataType {
    Null,
    Boolean,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt64,
    Utf8,
    Binary,
    Date32,
    Time64Microsecond,
    Timestamp,
}

impl DataType {
    /// the float family is the only one where NaN is treated as missing
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 | DataType::UInt64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_float() || self.is_integer()
    }

    /// a null value carrying this type
    pub fn null_value(&self) -> DataValue {
        match self {
            DataType::Null => DataValue::Null,
            DataType::Boolean => DataValue::Boolean(None),
            DataType::Float32 => DataValue::Float32(None),
            DataType::Float64 => DataValue::Float64(None),
            DataType::Int8 => DataValue::Int8(None),
            DataType::Int16 => DataValue::Int16(None),
            DataType::Int32 => DataValue::Int32(None),
            DataType::Int64 => DataValue::Int64(None),
            DataType::UInt64 => DataValue::UInt64(None),
            DataType::Utf8 => DataValue::Utf8(None),
            DataType::Binary => DataValue::Binary(None),
            DataType::Date32 => DataValue::Date32(None),
            DataType::Time64Microsecond => DataValue::Time64Microsecond(None),
            DataType::Timestamp => DataValue::Timestamp(None),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl DataValue {
    pub fn get_datatype(&self) -> DataType {
        match self {
            DataValue::Null => DataType::Null,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::Float32(_) => DataType::Float32,
            DataValue::Float64(_) => DataType::Float64,
            DataValue::Int8(_) => DataType::Int8,
            DataValue::Int16(_) => DataType::Int16,
            DataValue::Int32(_) => DataType::Int32,
            DataValue::Int64(_) => DataType::Int64,
            DataValue::UInt64(_) => DataType::UInt64,
            DataValue::Utf8(_) => DataType::Utf8,
            DataValue::Binary(_) => DataType::Binary,
            DataValue::Date32(_) => DataType::Date32,
            DataValue::Time64Microsecond(_) => DataType::Time64Microsecond,
            DataValue::Timestamp(_) => DataType::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Boolean(v) => v.is_none(),
            DataValue::Float32(v) => v.is_none(),
            DataValue::Float64(v) => v.is_none(),
            DataValue::Int8(v) => v.is_none(),
            DataValue::Int16(v) => v.is_none(),
            DataValue::Int32(v) => v.is_none(),
            DataValue::Int64(v) => v.is_none(),
            DataValue::UInt64(v) => v.is_none(),
            DataValue::Utf8(v) => v.is_none(),
            DataValue::Binary(v) => v.is_none(),
            DataValue::Date32(v) => v.is_none(),
            DataValue::Time64Microsecond(v) => v.is_none(),
            DataValue::Timestamp(v) => v.is_none(),
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            DataValue::Float32(Some(v)) => v.is_nan(),
            DataValue::Float64(Some(v)) => v.is_nan(),
            _ => false,
        }
    }

    /// integral value of a non-null integer scalar
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            DataValue::Int8(Some(v)) => Some(*v as i128),
            DataValue::Int16(Some(v)) => Some(*v as i128),
            DataValue::Int32(Some(v)) => Some(*v as i128),
            DataValue::Int64(Some(v)) => Some(*v as i128),
            DataValue::UInt64(Some(v)) => Some(*v as i128),
            _ => None,
        }
    }

    /// numeric value of a non-null numeric scalar
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Float32(Some(v)) => Some(*v as f64),
            DataValue::Float64(Some(v)) => Some(*v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    /// convert between numeric types, other types only convert to themselves
    pub fn cast_to(&self, data_type: &DataType) -> Result<DataValue> {
        let this_type = self.get_datatype();
        if this_type == *data_type || *data_type == DataType::Null {
            return Ok(self.clone());
        }
        if self.is_null() {
            return Ok(data_type.null_value());
        }
        if !(this_type.is_numeric() && data_type.is_numeric()) {
            return Err(anyhow!(
                "cannot cast {self:?} from {this_type} to {data_type}"
            ));
        }
        let out_of_range = || anyhow!("value {self} out of range for {data_type}");
        let value = match data_type {
            DataType::Float32 => DataValue::Float32(self.as_f64().map(|v| v as f32)),
            DataType::Float64 => DataValue::Float64(self.as_f64()),
            _ => {
                let v = self.as_i128().ok_or_else(|| {
                    anyhow!("cannot cast {self:?} from {this_type} to {data_type}")
                })?;
                match data_type {
                    DataType::Int8 => DataValue::Int8(Some(i8::try_from(v).map_err(|_| out_of_range())?)),
                    DataType::Int16 => DataValue::Int16(Some(i16::try_from(v).map_err(|_| out_of_range())?)),
                    DataType::Int32 => DataValue::Int32(Some(i32::try_from(v).map_err(|_| out_of_range())?)),
                    DataType::Int64 => DataValue::Int64(Some(i64::try_from(v).map_err(|_| out_of_range())?)),
                    DataType::UInt64 => DataValue::UInt64(Some(u64::try_from(v).map_err(|_| out_of_range())?)),
                    other => return Err(anyhow!("cannot cast {self:?} to {other}")),
                }
            }
        };
        Ok(value)
    }
}

/// hashes a float by its bit pattern, matching the equality above
struct Fl<T>(T);
macro_rules! hash_float_value {
    ($(($t:ty, $i:ty)),+) => {
        $(
            impl std::hash::Hash for Fl<$t> {
                #[inline]
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    state.write(&<$i>::from_ne_bytes(self.0.to_ne_bytes()).to_ne_bytes())
                }
            }
        )+
    };
}

hash_float_value!((f64, u64), (f32, u32));

impl std::hash::Hash for DataValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use DataValue::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Null => {}
            Boolean(v) => v.hash(state),
            Float32(v) => v.map(Fl).hash(state),
            Float64(v) => v.map(Fl).hash(state),
            Int8(v) => v.hash(state),
            Int16(v) => v.hash(state),
            Int32(v) => v.hash(state),
            Int64(v) => v.hash(state),
            UInt64(v) => v.hash(state),
            Utf8(v) => v.hash(state),
            Binary(v) => v.hash(state),
            Date32(v) => v.hash(state),
            Time64Microsecond(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_nan_literal_equals_itself() {
        let a = DataValue::Float64(Some(f64::NAN));
        let b = DataValue::Float64(Some(f64::NAN));
        assert_eq!(a, b);
        assert!(a.is_nan());
        assert_ne!(DataValue::Float64(Some(1.0)), DataValue::Int64(Some(1)));
    }

    #[test]
    fn test_cast_numeric() -> Result<()> {
        assert_eq!(
            DataValue::Int64(Some(3)).cast_to(&DataType::Float64)?,
            DataValue::Float64(Some(3.0))
        );
        assert_eq!(
            DataValue::Int64(Some(7)).cast_to(&DataType::Int32)?,
            DataValue::Int32(Some(7))
        );
        assert_eq!(
            DataValue::Null.cast_to(&DataType::Int32)?,
            DataValue::Int32(None)
        );
        assert!(DataValue::Int64(Some(i64::MAX)).cast_to(&DataType::Int32).is_err());
        assert!(DataValue::Utf8(Some("a".into())).cast_to(&DataType::Int32).is_err());
        Ok(())
    }

    #[test]
    fn test_display_temporal() {
        assert_eq!(DataValue::Date32(Some(1)).to_string(), "1970-01-02");
        assert_eq!(
            DataValue::Time64Microsecond(Some(3_600_000_001)).to_string(),
            "01:00:00.000001"
        );
        assert_eq!(DataValue::Timestamp(None).to_string(), "NULL");
    }
}
