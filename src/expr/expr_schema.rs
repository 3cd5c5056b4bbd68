use crate::common::{
    schema::{Field, Schema},
    types::DataType,
};
use crate::expr::expr::{BinaryExpr, Case, Expr};
use anyhow::{anyhow, Result};

use super::type_coercion::get_result_type;

/// we need to be able to compose a schema based on expressions
/// each time for a plan node, the output is a schema based on expressions
pub trait ExprToSchema {
    fn get_type(&self, schema: &Schema) -> Result<DataType>;
    fn nullable(&self, schema: &Schema) -> Result<bool>;
    fn to_field(&self, input_schema: &Schema) -> Result<Field>;
}

impl ExprToSchema for Expr {
    fn get_type(&self, schema: &Schema) -> Result<DataType> {
        match self {
            Expr::Alias(expr, ..) => expr.get_type(schema),
            Expr::Column(c) => Ok(*schema.field(c.index_in(schema)?).data_type()),
            Expr::Literal(l) => Ok(l.get_datatype()),
            Expr::Not(_) | Expr::IsNull(_) | Expr::IsNotNull(_) => Ok(DataType::Boolean),
            Expr::BinaryExpr(BinaryExpr {
                ref left,
                ref right,
                ref op,
            }) => get_result_type(&left.get_type(schema)?, op, &right.get_type(schema)?),
            // the else branch carries the type of the rewritten column, so it wins
            // over the literal branches
            Expr::Case(Case {
                when_then_expr,
                else_expr,
            }) => {
                if let Some(e) = else_expr {
                    let t = e.get_type(schema)?;
                    if t != DataType::Null {
                        return Ok(t);
                    }
                }
                for (_, then) in when_then_expr {
                    let t = then.get_type(schema)?;
                    if t != DataType::Null {
                        return Ok(t);
                    }
                }
                Ok(DataType::Null)
            }
        }
    }

    fn nullable(&self, schema: &Schema) -> Result<bool> {
        match self {
            Expr::Alias(expr, _) | Expr::Not(expr) => expr.nullable(schema),
            Expr::Column(c) => Ok(schema.field(c.index_in(schema)?).is_nullable()),
            Expr::Literal(value) => Ok(value.is_null()),
            Expr::IsNull(_) | Expr::IsNotNull(_) => Ok(false),
            Expr::BinaryExpr(BinaryExpr {
                ref left,
                ref right,
                ..
            }) => Ok(left.nullable(schema)? || right.nullable(schema)?),
            Expr::Case(Case {
                when_then_expr,
                else_expr,
            }) => {
                let else_nullable = match else_expr {
                    Some(e) => e.nullable(schema)?,
                    None => true,
                };
                if else_nullable {
                    return Ok(true);
                }
                for (_, then) in when_then_expr {
                    if then.nullable(schema)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn to_field(&self, input_schema: &Schema) -> Result<Field> {
        let name = match self {
            Expr::Column(c) => c.name.clone(),
            Expr::Alias(_, name) => name.clone(),
            _ => self.display_name()?,
        };
        if name.is_empty() {
            return Err(anyhow!("expression {self} has an empty output name"));
        }
        Ok(Field::new(
            name,
            self.get_type(input_schema)?,
            self.nullable(input_schema)?,
        ))
    }
}

/// build the output fields of a list of expressions
pub fn exprlist_to_fields<'a>(
    exprs: impl IntoIterator<Item = &'a Expr>,
    input_schema: &Schema,
) -> Result<Vec<Field>> {
    exprs
        .into_iter()
        .map(|e| e.to_field(input_schema))
        .collect()
}
