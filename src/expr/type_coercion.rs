use crate::common::types::DataType;
use crate::expr::expr::Operator;
use anyhow::{Context, Result};

pub fn is_numeric(dt: &DataType) -> bool {
    dt.is_numeric()
}

pub fn both_numeric_or_null_and_numeric(lhs_type: &DataType, rhs_type: &DataType) -> bool {
    match (lhs_type, rhs_type) {
        (_, DataType::Null) => is_numeric(lhs_type),
        (DataType::Null, _) => is_numeric(rhs_type),
        _ => is_numeric(lhs_type) && is_numeric(rhs_type),
    }
}

pub fn get_result_type(
    lhs_type: &DataType,
    op: &Operator,
    rhs_type: &DataType,
) -> Result<DataType> {
    let result = match op {
        Operator::And
        | Operator::Or
        | Operator::Eq
        | Operator::NotEq
        | Operator::Gt
        | Operator::GtEq
        | Operator::Lt
        | Operator::LtEq => Some(DataType::Boolean),
        Operator::Plus | Operator::Minus => mathmatical_numerical_coercion(lhs_type, rhs_type),
    };
    result.context(format!(
        "unsupported type. cannot evaluate {lhs_type:?} {op} {rhs_type:?}"
    ))
}

pub(crate) fn mathmatical_numerical_coercion(
    lhs_type: &DataType,
    rhs_type: &DataType,
) -> Option<DataType> {
    if !both_numeric_or_null_and_numeric(lhs_type, rhs_type) {
        return None;
    }
    match (lhs_type, rhs_type) {
        (DataType::Float64, _) | (_, DataType::Float64) => Some(DataType::Float64),
        (DataType::Float32, _) | (_, DataType::Float32) => Some(DataType::Float64),
        (DataType::UInt64, _) | (_, DataType::UInt64) => Some(DataType::Int64),
        (DataType::Int64, _) | (_, DataType::Int64) => Some(DataType::Int64),
        (DataType::Int32, _) | (_, DataType::Int32) => Some(DataType::Int32),
        (DataType::Int16, _) | (_, DataType::Int16) => Some(DataType::Int16),
        (DataType::Int8, _) | (_, DataType::Int8) => Some(DataType::Int8),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_result_type() -> Result<()> {
        assert_eq!(
            get_result_type(&DataType::Int64, &Operator::Plus, &DataType::Int64)?,
            DataType::Int64
        );
        assert_eq!(
            get_result_type(&DataType::Int32, &Operator::Plus, &DataType::Float32)?,
            DataType::Float64
        );
        assert_eq!(
            get_result_type(&DataType::Utf8, &Operator::Eq, &DataType::Utf8)?,
            DataType::Boolean
        );
        assert!(get_result_type(&DataType::Utf8, &Operator::Plus, &DataType::Int64).is_err());
        Ok(())
    }
}
