use crate::common::record_batch::RecordBatch;
use crate::common::schema::SchemaRef;
use crate::execution;
use crate::expr::expr::Expr;
use crate::expr::logical_plan::builder::LogicalPlanBuilder;
use crate::expr::logical_plan::LogicalPlan;
use crate::na::{self, DropRequest, FillRequest, ReplaceRequest, Rewrite, SkippedReplacement};
use crate::session::SessionState;
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// a lazily evaluated query over the tables of a session
#[derive(Clone)]
pub struct DataFrame {
    state: Arc<RwLock<SessionState>>,
    plan: LogicalPlan,
}

impl DataFrame {
    pub fn new(state: Arc<RwLock<SessionState>>, plan: LogicalPlan) -> Self {
        Self { state, plan }
    }

    pub fn schema(&self) -> SchemaRef {
        self.plan.output_schema()
    }

    pub fn logical_plan(&self) -> &LogicalPlan {
        &self.plan
    }

    fn with_plan(&self, plan: LogicalPlan) -> Self {
        Self::new(self.state.clone(), plan)
    }

    pub fn select(&self, exprs: impl IntoIterator<Item = impl Into<Expr>>) -> Result<Self> {
        let plan = LogicalPlanBuilder::from(self.plan.clone())
            .project(exprs)?
            .build()?;
        Ok(self.with_plan(plan))
    }

    pub fn filter(&self, predicate: Expr) -> Result<Self> {
        let plan = LogicalPlanBuilder::from(self.plan.clone())
            .filter(predicate)?
            .build()?;
        Ok(self.with_plan(plan))
    }

    pub fn limit(&self, skip: usize, fetch: Option<usize>) -> Result<Self> {
        let plan = LogicalPlanBuilder::from(self.plan.clone())
            .limit(skip, fetch)?
            .build()?;
        Ok(self.with_plan(plan))
    }

    /// missing value handling on this dataframe
    pub fn na(&self) -> DataFrameNaFunctions<'_> {
        DataFrameNaFunctions { df: self }
    }

    /// evaluate the plan locally
    pub fn collect(&self) -> Result<RecordBatch> {
        let options = self.state.read().config().execution.clone();
        execution::collect(&self.plan, &options)
    }
}

/// the dataframe a na function produced and the replacements it skipped
pub struct NaOutput {
    pub df: DataFrame,
    pub skipped: Vec<SkippedReplacement>,
}

pub struct DataFrameNaFunctions<'a> {
    df: &'a DataFrame,
}

impl<'a> DataFrameNaFunctions<'a> {
    fn output(&self, rewrite: Rewrite) -> NaOutput {
        NaOutput {
            df: self.df.with_plan(rewrite.plan),
            skipped: rewrite.skipped,
        }
    }

    pub fn drop(&self, request: &DropRequest) -> Result<NaOutput> {
        let config = self.df.state.read().config().clone();
        Ok(self.output(na::drop(&self.df.plan, request, &config)?))
    }

    pub fn fill(&self, request: &FillRequest) -> Result<NaOutput> {
        let config = self.df.state.read().config().clone();
        Ok(self.output(na::fill(&self.df.plan, request, &config)?))
    }

    pub fn replace(&self, request: &ReplaceRequest) -> Result<NaOutput> {
        let config = self.df.state.read().config().clone();
        Ok(self.output(na::replace(&self.df.plan, request, &config)?))
    }
}
