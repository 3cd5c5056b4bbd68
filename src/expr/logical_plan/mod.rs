pub mod builder;

use crate::common::schema::{Schema, SchemaRef};
use crate::common::types::DataType;
use crate::expr::expr::{fmt_exprs, Expr};
use crate::expr::expr_schema::{exprlist_to_fields, ExprToSchema};
use crate::storage::Table;
use anyhow::{anyhow, Result};
use std::hash::Hash;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum LogicalPlan {
    Projection(Projection),
    Filter(Filter),
    TableScan(TableScan),
    Limit(Limit),
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Projection {
    pub exprs: Vec<Expr>,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    pub predicate: Expr,
    pub input: Arc<LogicalPlan>,
}

#[derive(Clone)]
pub struct TableScan {
    pub table_name: String,
    pub source: Arc<dyn Table>,
    pub projected_schema: SchemaRef,
}

/// scans compare by table name and schema, the source is not compared
impl PartialEq for TableScan {
    fn eq(&self, other: &Self) -> bool {
        self.table_name == other.table_name && self.projected_schema == other.projected_schema
    }
}
impl Eq for TableScan {}

impl Hash for TableScan {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.table_name.hash(state);
        self.projected_schema.hash(state);
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Limit {
    pub skip: usize,
    pub fetch: Option<usize>,
    pub input: Arc<LogicalPlan>,
}

impl LogicalPlan {
    /// schema of the rows this node produces
    pub fn output_schema(&self) -> SchemaRef {
        match self {
            LogicalPlan::TableScan(scan) => scan.projected_schema.clone(),
            LogicalPlan::Projection(projection) => projection.schema.clone(),
            LogicalPlan::Filter(Filter { input, .. }) | LogicalPlan::Limit(Limit { input, .. }) => {
                input.output_schema()
            }
        }
    }

    /// direct children, a scan has none
    pub fn inputs(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::TableScan(_) => vec![],
            LogicalPlan::Projection(Projection { input, .. })
            | LogicalPlan::Filter(Filter { input, .. })
            | LogicalPlan::Limit(Limit { input, .. }) => vec![input.as_ref()],
        }
    }

    /// one line describing this node only
    pub fn display(&self) -> impl std::fmt::Display + '_ {
        struct Node<'a>(&'a LogicalPlan);
        impl std::fmt::Display for Node<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.0 {
                    LogicalPlan::TableScan(scan) => write!(
                        f,
                        "TableScan: {} projection=[{}]",
                        scan.table_name,
                        scan.projected_schema.column_names().join(", ")
                    ),
                    LogicalPlan::Projection(projection) => {
                        write!(f, "Projection: {}", fmt_exprs(&projection.exprs))
                    }
                    LogicalPlan::Filter(filter) => write!(f, "Filter: {}", filter.predicate),
                    LogicalPlan::Limit(limit) => match limit.fetch {
                        Some(fetch) => write!(f, "Limit: skip={}, fetch={fetch}", limit.skip),
                        None => write!(f, "Limit: skip={}, fetch=None", limit.skip),
                    },
                }
            }
        }
        Node(self)
    }

    /// the whole tree, one node per line, children indented by two spaces
    pub fn display_indent(&self) -> impl std::fmt::Display + '_ {
        struct Tree<'a>(&'a LogicalPlan);
        fn write_tree(
            f: &mut std::fmt::Formatter<'_>,
            plan: &LogicalPlan,
            depth: usize,
        ) -> std::fmt::Result {
            if depth > 0 {
                writeln!(f)?;
            }
            write!(f, "{:width$}{}", "", plan.display(), width = depth * 2)?;
            plan.inputs()
                .into_iter()
                .try_for_each(|child| write_tree(f, child, depth + 1))
        }
        impl std::fmt::Display for Tree<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write_tree(f, self.0, 0)
            }
        }
        Tree(self)
    }

    /// expressions held by this node
    pub fn expressions(&self) -> Vec<Expr> {
        match self {
            LogicalPlan::Projection(projection) => projection.exprs.clone(),
            LogicalPlan::Filter(filter) => vec![filter.predicate.clone()],
            LogicalPlan::TableScan(_) | LogicalPlan::Limit(_) => vec![],
        }
    }
}

impl std::fmt::Debug for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_indent())
    }
}

impl Projection {
    /// the schema must hold one field per expression
    pub fn try_new_with_schema(
        exprs: Vec<Expr>,
        input: Arc<LogicalPlan>,
        schema: SchemaRef,
    ) -> Result<Self> {
        let width = schema.fields().len();
        if exprs.len() != width {
            return Err(anyhow!(
                "projection has {} expressions but its schema has {width} fields",
                exprs.len()
            ));
        }
        Ok(Self {
            exprs,
            input,
            schema,
        })
    }

    /// derive the output schema from the expressions
    pub fn try_new(exprs: Vec<Expr>, input: Arc<LogicalPlan>) -> Result<Self> {
        let input_schema = input.output_schema();
        let fields = exprlist_to_fields(&exprs, &input_schema)?;
        let schema = Schema::new_with_metadata(fields, input_schema.metadata().clone())?;
        Self::try_new_with_schema(exprs, input, Arc::new(schema))
    }
}

impl Filter {
    /// the predicate must be boolean
    pub fn try_new(predicate: Expr, input: Arc<LogicalPlan>) -> Result<Self> {
        match predicate.get_type(&input.output_schema())? {
            DataType::Boolean => Ok(Self { predicate, input }),
            other => Err(anyhow!(
                "filter predicate {predicate} has type {other}, expected Boolean"
            )),
        }
    }
}
