//! Local evaluation of logical plans over in-memory tables.
//!
//! Comparison follows the engine's float semantics: NaN equals NaN and
//! sorts above every other number. Null operands make comparisons and
//! arithmetic null.

use crate::common::config::ExecutionOptions;
use crate::common::record_batch::RecordBatch;
use crate::common::schema::Schema;
use crate::common::types::DataValue;
use crate::expr::expr::{BinaryExpr, Case, Expr, Operator};
use crate::expr::logical_plan::{Filter, Limit, LogicalPlan, Projection, TableScan};
use anyhow::{anyhow, Result};
use std::cmp::Ordering;
use tracing::debug;

/// run the plan and gather all rows
pub fn collect(plan: &LogicalPlan, options: &ExecutionOptions) -> Result<RecordBatch> {
    match plan {
        LogicalPlan::TableScan(TableScan { source, .. }) => source.scan(options.max_rows),
        LogicalPlan::Filter(Filter { predicate, input }) => {
            let batch = collect(input, options)?;
            let mut rows = Vec::with_capacity(batch.rows.len());
            for row in batch.rows {
                match evaluate(predicate, &batch.schema, &row)? {
                    DataValue::Boolean(Some(true)) => rows.push(row),
                    DataValue::Boolean(_) | DataValue::Null => {}
                    other => {
                        return Err(anyhow!("filter predicate returned non-boolean {other:?}"))
                    }
                }
            }
            RecordBatch::try_new(batch.schema, rows)
        }
        LogicalPlan::Projection(Projection {
            exprs,
            input,
            schema,
        }) => {
            let batch = collect(input, options)?;
            let rows = batch
                .rows
                .iter()
                .map(|row| {
                    exprs
                        .iter()
                        .zip(schema.fields().iter())
                        .map(|(e, field)| evaluate(e, &batch.schema, row)?.cast_to(field.data_type()))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;
            RecordBatch::try_new(schema.clone(), rows)
        }
        LogicalPlan::Limit(Limit { skip, fetch, input }) => {
            if *fetch == Some(0) {
                debug!("limit fetches no rows, skip evaluating input");
                return RecordBatch::try_new(input.output_schema(), vec![]);
            }
            let batch = collect(input, options)?;
            let rows = batch
                .rows
                .into_iter()
                .skip(*skip)
                .take(fetch.unwrap_or(usize::MAX))
                .collect();
            RecordBatch::try_new(batch.schema, rows)
        }
    }
}

/// evaluate an expression against a single row
pub fn evaluate(expr: &Expr, schema: &Schema, row: &[DataValue]) -> Result<DataValue> {
    match expr {
        Expr::Alias(e, _) => evaluate(e, schema, row),
        Expr::Column(c) => Ok(row[c.index_in(schema)?].clone()),
        Expr::Literal(v) => Ok(v.clone()),
        Expr::IsNull(e) => Ok(DataValue::Boolean(Some(evaluate(e, schema, row)?.is_null()))),
        Expr::IsNotNull(e) => Ok(DataValue::Boolean(Some(
            !evaluate(e, schema, row)?.is_null(),
        ))),
        Expr::Not(e) => match evaluate(e, schema, row)? {
            DataValue::Boolean(v) => Ok(DataValue::Boolean(v.map(|b| !b))),
            DataValue::Null => Ok(DataValue::Boolean(None)),
            other => Err(anyhow!("NOT applied to non-boolean {other:?}")),
        },
        Expr::BinaryExpr(BinaryExpr { left, op, right }) => {
            let l = evaluate(left, schema, row)?;
            let r = evaluate(right, schema, row)?;
            evaluate_binary(&l, op, &r)
        }
        Expr::Case(Case {
            when_then_expr,
            else_expr,
        }) => {
            for (when, then) in when_then_expr {
                if let DataValue::Boolean(Some(true)) = evaluate(when, schema, row)? {
                    return evaluate(then, schema, row);
                }
            }
            match else_expr {
                Some(e) => evaluate(e, schema, row),
                None => Ok(DataValue::Null),
            }
        }
    }
}

fn as_bool(v: &DataValue) -> Result<Option<bool>> {
    match v {
        DataValue::Boolean(b) => Ok(*b),
        DataValue::Null => Ok(None),
        other => Err(anyhow!("expected boolean, got {other:?}")),
    }
}

fn evaluate_binary(l: &DataValue, op: &Operator, r: &DataValue) -> Result<DataValue> {
    match op {
        Operator::And => {
            let (l, r) = (as_bool(l)?, as_bool(r)?);
            Ok(DataValue::Boolean(match (l, r) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            }))
        }
        Operator::Or => {
            let (l, r) = (as_bool(l)?, as_bool(r)?);
            Ok(DataValue::Boolean(match (l, r) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            }))
        }
        Operator::Plus | Operator::Minus => arithmetic(l, op, r),
        _ => {
            if l.is_null() || r.is_null() {
                return Ok(DataValue::Boolean(None));
            }
            let ordering = compare(l, r)?;
            let result = match op {
                Operator::Eq => ordering == Ordering::Equal,
                Operator::NotEq => ordering != Ordering::Equal,
                Operator::Lt => ordering == Ordering::Less,
                Operator::LtEq => ordering != Ordering::Greater,
                Operator::Gt => ordering == Ordering::Greater,
                Operator::GtEq => ordering != Ordering::Less,
                _ => return Err(anyhow!("unsupported comparison operator {op}")),
            };
            Ok(DataValue::Boolean(Some(result)))
        }
    }
}

/// order two non-null scalars; numbers compare across numeric types
fn compare(l: &DataValue, r: &DataValue) -> Result<Ordering> {
    if let (Some(a), Some(b)) = (l.as_i128(), r.as_i128()) {
        return Ok(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return Ok(match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        });
    }
    match (l, r) {
        (DataValue::Boolean(Some(a)), DataValue::Boolean(Some(b))) => Ok(a.cmp(b)),
        (DataValue::Utf8(Some(a)), DataValue::Utf8(Some(b))) => Ok(a.cmp(b)),
        (DataValue::Binary(Some(a)), DataValue::Binary(Some(b))) => Ok(a.cmp(b)),
        (DataValue::Date32(Some(a)), DataValue::Date32(Some(b))) => Ok(a.cmp(b)),
        (DataValue::Time64Microsecond(Some(a)), DataValue::Time64Microsecond(Some(b))) => {
            Ok(a.cmp(b))
        }
        (DataValue::Timestamp(Some(a)), DataValue::Timestamp(Some(b))) => Ok(a.cmp(b)),
        _ => Err(anyhow!("cannot compare {l:?} with {r:?}")),
    }
}

fn arithmetic(l: &DataValue, op: &Operator, r: &DataValue) -> Result<DataValue> {
    let result_type = crate::expr::type_coercion::mathmatical_numerical_coercion(
        &l.get_datatype(),
        &r.get_datatype(),
    )
    .ok_or_else(|| anyhow!("cannot evaluate {l:?} {op} {r:?}"))?;
    if l.is_null() || r.is_null() {
        return Ok(result_type.null_value());
    }
    if result_type.is_float() {
        let (a, b) = (l.as_f64(), r.as_f64());
        let (a, b) = a.zip(b).ok_or_else(|| anyhow!("cannot evaluate {l:?} {op} {r:?}"))?;
        let v = if *op == Operator::Plus { a + b } else { a - b };
        return Ok(DataValue::Float64(Some(v)));
    }
    let (a, b) = l
        .as_i128()
        .zip(r.as_i128())
        .ok_or_else(|| anyhow!("cannot evaluate {l:?} {op} {r:?}"))?;
    let v = if *op == Operator::Plus { a + b } else { a - b };
    DataValue::Int64(Some(
        i64::try_from(v).map_err(|_| anyhow!("integer overflow evaluating {l:?} {op} {r:?}"))?,
    ))
    .cast_to(&result_type)
}
