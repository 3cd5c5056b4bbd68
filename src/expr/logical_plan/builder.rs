use crate::common::schema::SchemaRef;
use crate::expr::logical_plan::{Filter, Limit, LogicalPlan, Projection, TableScan};
use crate::expr::expr::Expr;
use crate::storage::Table;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub struct LogicalPlanBuilder {
    plan: LogicalPlan,
}

impl LogicalPlanBuilder {
    pub fn from(plan: LogicalPlan) -> Self {
        Self { plan }
    }

    pub fn schema(&self) -> SchemaRef {
        self.plan.output_schema()
    }

    pub fn build(self) -> Result<LogicalPlan> {
        Ok(self.plan)
    }

    pub fn scan(table_name: impl Into<String>, table_source: Arc<dyn Table>) -> Result<Self> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(anyhow!("table name cannot be empty"));
        }
        let projected_schema = table_source.schema();
        Ok(Self::from(LogicalPlan::TableScan(TableScan {
            table_name,
            source: table_source,
            projected_schema,
        })))
    }

    pub fn project(self, expr: impl IntoIterator<Item = impl Into<Expr>>) -> Result<Self> {
        Ok(Self::from(project(self.plan, expr)?))
    }

    pub fn filter(self, predicate: Expr) -> Result<Self> {
        Ok(Self::from(LogicalPlan::Filter(Filter::try_new(
            predicate,
            Arc::new(self.plan),
        )?)))
    }

    pub fn limit(self, skip: usize, fetch: Option<usize>) -> Result<Self> {
        Ok(Self::from(LogicalPlan::Limit(Limit {
            skip,
            fetch,
            input: Arc::new(self.plan),
        })))
    }
}

pub fn project(
    plan: LogicalPlan,
    expr: impl IntoIterator<Item = impl Into<Expr>>,
) -> Result<LogicalPlan> {
    let projected_expr = expr.into_iter().map(|e| e.into()).collect::<Vec<Expr>>();
    validate_unique_names("Projections", projected_expr.iter())?;
    Ok(LogicalPlan::Projection(Projection::try_new(
        projected_expr,
        Arc::new(plan),
    )?))
}

pub fn validate_unique_names<'a>(
    node_name: &str,
    expressions: impl IntoIterator<Item = &'a Expr>,
) -> Result<()> {
    let mut unique_names = HashMap::new();
    expressions
        .into_iter()
        .enumerate()
        .try_for_each(|(position, expr)| {
            let name = expr.display_name()?;
            match unique_names.get(&name) {
                None => {
                    unique_names.insert(name, (position, expr));
                    Ok(())
                }
                Some((_existing_position, existing_expr)) => Err(anyhow!(format!(
                    "{node_name} requires unique expression names but expression {existing_expr} and {expr} as the same name"
                ))),
            }
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::schema::{Field, Schema};
    use crate::common::types::DataType;
    use crate::expr::expr::col;
    use crate::expr::literal::lit;
    use crate::storage::memory::MemTable;

    fn scan() -> Result<LogicalPlanBuilder> {
        let schema = Arc::new(Schema::try_new(vec![
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Utf8, true),
        ])?);
        LogicalPlanBuilder::scan("t", Arc::new(MemTable::try_new(schema, vec![])?))
    }

    #[test]
    fn test_build_plan() -> Result<()> {
        let plan = scan()?
            .filter(col("a").gt_eq(lit(1i64)))?
            .project(vec![col("b"), col("a")])?
            .limit(0, Some(0))?
            .build()?;
        assert_eq!(
            plan.display_indent().to_string(),
            "Limit: skip=0, fetch=0\n  Projection: \"b\", \"a\"\n    Filter: \"a\" >= Int64(1)\n      TableScan: t projection=[\"a\", \"b\"]"
        );
        assert_eq!(
            plan.output_schema().column_names(),
            vec!["\"b\"".to_string(), "\"a\"".to_string()]
        );
        Ok(())
    }

    #[test]
    fn test_filter_requires_boolean() -> Result<()> {
        assert!(scan()?.filter(col("a") + lit(1i64)).is_err());
        Ok(())
    }

    #[test]
    fn test_project_rejects_duplicate_names() -> Result<()> {
        assert!(scan()?.project(vec![col("a"), col("A")]).is_err());
        Ok(())
    }
}
