//! Missing value handling: `drop`, `fill` and `replace`.
//!
//! Each function takes a logical plan and returns a new one. `drop` wraps
//! the input in a filter over a per row count of valid values. `fill` and
//! `replace` project every column of the input in schema order, rewriting the
//! selected ones with conditional expressions. Nothing is evaluated here.
//!
//! A value whose type does not fit a column is not an error. The affected
//! replacement is left out of the plan and reported as a [`SkippedReplacement`].

pub mod args;
pub mod value;

use crate::common::config::ConfigOptions;
use crate::common::schema::{Field, Schema};
use crate::common::types::DataType;
use crate::common::utils::canonicalize;
use crate::error::NaError;
use crate::expr::expr::{col, iff, when, CaseBuilder, Expr};
use crate::expr::literal::lit;
use crate::expr::logical_plan::builder::LogicalPlanBuilder;
use crate::expr::logical_plan::LogicalPlan;
use anyhow::Result;
use args::{fill_values, normalize_subset, replacement_map, ArgValue};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::{debug, warn};
use value::{compatible, LiteralValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropHow {
    /// drop a row holding any missing value
    Any,
    /// drop a row only when every value is missing
    All,
}

impl FromStr for DropHow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(DropHow::Any),
            "all" => Ok(DropHow::All),
            other => Err(NaError::InvalidArgumentValue(format!(
                "how ('{other}') should be 'any' or 'all'"
            ))
            .into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DropRequest {
    pub how: Option<String>,
    pub thresh: Option<i64>,
    pub subset: Option<ArgValue>,
}

impl DropRequest {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn how(mut self, how: impl Into<String>) -> Self {
        self.how = Some(how.into());
        self
    }
    /// minimum number of valid values a row needs to be kept
    pub fn thresh(mut self, thresh: i64) -> Self {
        self.thresh = Some(thresh);
        self
    }
    pub fn subset(mut self, subset: impl Into<ArgValue>) -> Self {
        self.subset = Some(subset.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FillRequest {
    /// a scalar, or a map from column name to value
    pub value: ArgValue,
    pub subset: Option<ArgValue>,
}

impl FillRequest {
    pub fn new(value: impl Into<ArgValue>) -> Self {
        Self {
            value: value.into(),
            subset: None,
        }
    }
    pub fn subset(mut self, subset: impl Into<ArgValue>) -> Self {
        self.subset = Some(subset.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReplaceRequest {
    /// a scalar, a list, or a map from value to replacement
    pub to_replace: ArgValue,
    /// absent means null
    pub value: Option<ArgValue>,
    pub subset: Option<ArgValue>,
}

impl ReplaceRequest {
    pub fn new(to_replace: impl Into<ArgValue>) -> Self {
        Self {
            to_replace: to_replace.into(),
            value: None,
            subset: None,
        }
    }
    pub fn value(mut self, value: impl Into<ArgValue>) -> Self {
        self.value = Some(value.into());
        self
    }
    pub fn subset(mut self, subset: impl Into<ArgValue>) -> Self {
        self.subset = Some(subset.into());
        self
    }
}

/// a fill value or replacement pair left out because its type does not fit the column
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedReplacement {
    pub column: String,
    pub data_type: DataType,
    /// the matched value, only set for replace
    pub key: Option<LiteralValue>,
    pub value: LiteralValue,
}

impl std::fmt::Display for SkippedReplacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(
                f,
                "input key or value type doesn't match the target column data type, this replacement was skipped. \
                 column name: {}, type: {}, input key: {}, type: {}, input value: {}, type: {}",
                self.column,
                self.data_type,
                key,
                key.kind(),
                self.value,
                self.value.kind()
            ),
            None => write!(
                f,
                "input value type doesn't match the target column data type, this replacement was skipped. \
                 column name: {}, type: {}, input value: {}, type: {}",
                self.column,
                self.data_type,
                self.value,
                self.value.kind()
            ),
        }
    }
}

/// the rewritten plan together with the replacements that were left out
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub plan: LogicalPlan,
    pub skipped: Vec<SkippedReplacement>,
}

impl Rewrite {
    fn unchanged(plan: &LogicalPlan) -> Self {
        Self {
            plan: plan.clone(),
            skipped: vec![],
        }
    }
}

/// `col IS NULL`, or `col = NaN OR col IS NULL` for float columns
fn is_missing(field: &Field) -> Expr {
    let c = col(field.name());
    if field.data_type().is_float() {
        c.clone().eq(lit(f64::NAN)).or(c.is_null())
    } else {
        c.is_null()
    }
}

/// every name must exist in the schema
fn resolve<'a>(schema: &Schema, names: impl IntoIterator<Item = &'a String>) -> Result<()> {
    for name in names {
        if schema.index_of(name).is_none() {
            return Err(NaError::UnresolvedColumn(name.clone()).into());
        }
    }
    Ok(())
}

fn report(skipped: &SkippedReplacement, config: &ConfigOptions) {
    if config.na.warn_on_skipped {
        warn!("{skipped}");
    }
}

/// keep the rows with at least `thresh` valid values among the selected columns.
/// a value is valid when it is not null, and for float columns not NaN either
pub fn drop(plan: &LogicalPlan, request: &DropRequest, config: &ConfigOptions) -> Result<Rewrite> {
    let how: DropHow = request
        .how
        .as_deref()
        .unwrap_or(config.na.default_how.as_str())
        .parse()?;
    let schema = plan.output_schema();
    let subset = normalize_subset(request.subset.as_ref(), &schema)?;
    let selected = subset.len() as i64;
    let thresh = request.thresh.unwrap_or(match how {
        DropHow::Any => selected,
        DropHow::All => 1,
    });

    if thresh < 1 || subset.is_empty() {
        debug!(thresh, selected, "drop keeps every row");
        return Ok(Rewrite::unchanged(plan));
    }
    if thresh > selected {
        debug!(thresh, selected, "drop threshold above selected column count");
        let plan = LogicalPlanBuilder::from(plan.clone())
            .limit(0, Some(0))?
            .build()?;
        return Ok(Rewrite {
            plan,
            skipped: vec![],
        });
    }

    let requested = subset
        .iter()
        .map(|name| canonicalize(name))
        .unique()
        .collect::<Vec<_>>();
    resolve(&schema, &requested)?;
    let requested = requested.into_iter().collect::<HashSet<_>>();
    let counter = schema
        .fields()
        .iter()
        .filter(|field| requested.contains(field.name()))
        .map(|field| iff(is_missing(field), lit(0i64), lit(1i64)))
        .reduce(|acc, e| acc + e);
    let plan = match counter {
        Some(counter) => LogicalPlanBuilder::from(plan.clone())
            .filter(counter.gt_eq(lit(thresh)))?
            .build()?,
        None => plan.clone(),
    };
    debug!("drop rewrote plan:\n{}", plan.display_indent());
    Ok(Rewrite {
        plan,
        skipped: vec![],
    })
}

/// replace null, and NaN in float columns, with the given values
pub fn fill(plan: &LogicalPlan, request: &FillRequest, config: &ConfigOptions) -> Result<Rewrite> {
    let schema = plan.output_schema();
    let subset = normalize_subset(request.subset.as_ref(), &schema)?;
    let values = fill_values(&request.value, &subset)?;
    if values.is_empty() {
        debug!("fill has no values, plan unchanged");
        return Ok(Rewrite::unchanged(plan));
    }
    let values = values
        .into_iter()
        .map(|(name, value)| (canonicalize(&name), value))
        .collect::<Vec<_>>();
    resolve(&schema, values.iter().map(|(name, _)| name))?;
    // later entries for the same column win
    let values = values.into_iter().collect::<HashMap<_, _>>();

    let mut skipped = vec![];
    let mut exprs = Vec::with_capacity(schema.fields().len());
    for field in schema.fields().iter() {
        let c = col(field.name());
        let expr = match values.get(field.name()) {
            Some(value) if compatible(value, field.data_type()) => {
                iff(is_missing(field), value.lit(), c).alias(field.name())
            }
            Some(value) => {
                let skip = SkippedReplacement {
                    column: field.name().clone(),
                    data_type: *field.data_type(),
                    key: None,
                    value: value.clone(),
                };
                report(&skip, config);
                skipped.push(skip);
                c
            }
            None => c,
        };
        exprs.push(expr);
    }
    let plan = LogicalPlanBuilder::from(plan.clone())
        .project(exprs)?
        .build()?;
    debug!("fill rewrote plan:\n{}", plan.display_indent());
    Ok(Rewrite { plan, skipped })
}

/// replace matching values in the selected columns; the first matching key wins
pub fn replace(
    plan: &LogicalPlan,
    request: &ReplaceRequest,
    config: &ConfigOptions,
) -> Result<Rewrite> {
    let schema = plan.output_schema();
    let subset = normalize_subset(request.subset.as_ref(), &schema)?;
    if subset.is_empty() {
        debug!("replace has an empty subset, plan unchanged");
        return Ok(Rewrite::unchanged(plan));
    }
    let replacement = replacement_map(&request.to_replace, request.value.as_ref())?;
    if replacement.is_empty() {
        debug!("replace has no replacements, plan unchanged");
        return Ok(Rewrite::unchanged(plan));
    }
    let selected = subset
        .iter()
        .map(|name| canonicalize(name))
        .collect::<Vec<_>>();
    resolve(&schema, &selected)?;
    let selected = selected.into_iter().collect::<HashSet<_>>();

    let mut skipped = vec![];
    let mut exprs = Vec::with_capacity(schema.fields().len());
    for field in schema.fields().iter() {
        let c = col(field.name());
        if !selected.contains(field.name()) {
            exprs.push(c);
            continue;
        }
        let mut case: Option<CaseBuilder> = None;
        for (key, value) in replacement.iter() {
            if !(compatible(key, field.data_type()) && compatible(value, field.data_type())) {
                let skip = SkippedReplacement {
                    column: field.name().clone(),
                    data_type: *field.data_type(),
                    key: Some(key.clone()),
                    value: value.clone(),
                };
                report(&skip, config);
                skipped.push(skip);
                continue;
            }
            let cond = if key.is_null() {
                c.clone().is_null()
            } else {
                c.clone().eq(key.lit())
            };
            case = Some(match case {
                None => when(cond, value.lit()),
                Some(case) => case.when(cond, value.lit()),
            });
        }
        exprs.push(match case {
            Some(case) => case.otherwise(c).alias(field.name()),
            None => c,
        });
    }
    let plan = LogicalPlanBuilder::from(plan.clone())
        .project(exprs)?
        .build()?;
    debug!("replace rewrote plan:\n{}", plan.display_indent());
    Ok(Rewrite { plan, skipped })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::types::DataValue;
    use crate::expr::expr::Case;
    use crate::expr::logical_plan::{Filter, Limit, Projection};
    use crate::storage::memory::MemTable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    fn scan() -> Result<LogicalPlan> {
        let schema = Arc::new(Schema::try_new(vec![
            Field::new("a", DataType::Float64, true),
            Field::new("b", DataType::Int32, true),
            Field::new("c", DataType::Utf8, true),
        ])?);
        LogicalPlanBuilder::scan("t", Arc::new(MemTable::try_new(schema, vec![])?))?.build()
    }

    fn na_error(r: Result<Rewrite>) -> NaError {
        match r {
            Ok(r) => panic!("expected error, got plan {:?}", r.plan),
            Err(e) => e.downcast_ref::<NaError>().cloned().unwrap(),
        }
    }

    fn projection_exprs(plan: &LogicalPlan) -> Vec<Expr> {
        match plan {
            LogicalPlan::Projection(Projection { exprs, .. }) => exprs.clone(),
            other => panic!("expected projection, got {other:?}"),
        }
    }

    #[test]
    fn test_drop_how() -> Result<()> {
        assert_eq!("any".parse::<DropHow>()?, DropHow::Any);
        assert_eq!("all".parse::<DropHow>()?, DropHow::All);
        let err = "some".parse::<DropHow>().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NaError>(),
            Some(NaError::InvalidArgumentValue(_))
        ));
        Ok(())
    }

    #[test]
    fn test_drop_builds_counter_in_schema_order() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let rewrite = drop(&plan, &DropRequest::new().subset(["c", "A"]), &config)?;
        let expected = iff(
            col("a").eq(lit(f64::NAN)).or(col("a").is_null()),
            lit(0i64),
            lit(1i64),
        ) + iff(col("c").is_null(), lit(0i64), lit(1i64));
        match &rewrite.plan {
            LogicalPlan::Filter(Filter { predicate, input }) => {
                assert_eq!(*predicate, expected.gt_eq(lit(2i64)));
                assert_eq!(input.as_ref(), &plan);
            }
            other => panic!("expected filter, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_drop_thresholds() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let r = drop(&plan, &DropRequest::new().thresh(0), &config)?;
        assert_eq!(r.plan, plan);
        let r = drop(&plan, &DropRequest::new().subset(Vec::<String>::new()), &config)?;
        assert_eq!(r.plan, plan);
        let r = drop(&plan, &DropRequest::new().thresh(4), &config)?;
        assert!(matches!(
            r.plan,
            LogicalPlan::Limit(Limit {
                skip: 0,
                fetch: Some(0),
                ..
            })
        ));
        // duplicates count toward the threshold, the counter sees each column once
        let r = drop(&plan, &DropRequest::new().thresh(2).subset(["a", "a"]), &config)?;
        assert!(matches!(r.plan, LogicalPlan::Filter(_)));
        let r = drop(&plan, &DropRequest::new().subset(["a", "A"]), &config)?;
        match r.plan {
            LogicalPlan::Filter(Filter { predicate, .. }) => {
                assert_eq!(predicate.to_string().matches("CASE").count(), 1);
                assert!(predicate.to_string().ends_with(">= Int64(2)"));
            }
            other => panic!("expected filter, got {other:?}"),
        }
        let r = drop(&plan, &DropRequest::new().thresh(3).subset(["a", "a"]), &config)?;
        assert!(matches!(r.plan, LogicalPlan::Limit(_)));
        let r = drop(&plan, &DropRequest::new().how("all"), &config)?;
        match r.plan {
            LogicalPlan::Filter(Filter { predicate, .. }) => {
                assert!(predicate.to_string().ends_with(">= Int64(1)"))
            }
            other => panic!("expected filter, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_drop_errors() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        assert!(matches!(
            na_error(drop(&plan, &DropRequest::new().how("most"), &config)),
            NaError::InvalidArgumentValue(_)
        ));
        assert!(matches!(
            na_error(drop(&plan, &DropRequest::new().subset(1i64), &config)),
            NaError::InvalidArgumentShape(_)
        ));
        assert_eq!(
            na_error(drop(&plan, &DropRequest::new().subset(["a", "zz"]), &config)),
            NaError::UnresolvedColumn("\"zz\"".into())
        );
        Ok(())
    }

    #[test]
    fn test_drop_default_how_from_config() -> Result<()> {
        let plan = scan()?;
        let mut config = ConfigOptions::new();
        config.set("na.default_how", "all")?;
        let r = drop(&plan, &DropRequest::new(), &config)?;
        match r.plan {
            LogicalPlan::Filter(Filter { predicate, .. }) => {
                assert!(predicate.to_string().ends_with(">= Int64(1)"))
            }
            other => panic!("expected filter, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_fill_scalar() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let r = fill(&plan, &FillRequest::new(7i64), &config)?;
        let exprs = projection_exprs(&r.plan);
        assert_eq!(
            exprs,
            vec![
                iff(
                    col("a").eq(lit(f64::NAN)).or(col("a").is_null()),
                    lit(7i64),
                    col("a")
                )
                .alias("\"a\""),
                iff(col("b").is_null(), lit(7i64), col("b")).alias("\"b\""),
                col("c"),
            ]
        );
        assert_eq!(r.skipped.len(), 1);
        assert_eq!(r.skipped[0].column, "\"c\"");
        assert_eq!(r.skipped[0].data_type, DataType::Utf8);
        assert_eq!(r.plan.output_schema().column_names(), plan.output_schema().column_names());
        Ok(())
    }

    #[test]
    fn test_fill_float_into_int_is_skipped() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let r = fill(&plan, &FillRequest::new(1.5).subset(["a", "b"]), &config)?;
        let exprs = projection_exprs(&r.plan);
        assert!(matches!(exprs[0], Expr::Alias(..)));
        assert_eq!(exprs[1], col("b"));
        assert_eq!(
            r.skipped,
            vec![SkippedReplacement {
                column: "\"b\"".into(),
                data_type: DataType::Int32,
                key: None,
                value: LiteralValue::Float(1.5),
            }]
        );
        Ok(())
    }

    #[test]
    fn test_fill_map() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let value = ArgValue::map([
            ("C", ArgValue::from("x")),
            ("c", ArgValue::from("y")),
        ]);
        let r = fill(&plan, &FillRequest::new(value).subset("b"), &config)?;
        let exprs = projection_exprs(&r.plan);
        assert_eq!(exprs[0], col("a"));
        assert_eq!(exprs[1], col("b"));
        assert_eq!(
            exprs[2],
            iff(col("c").is_null(), lit("y"), col("c")).alias("\"c\"")
        );
        assert!(r.skipped.is_empty());

        let r = fill(&plan, &FillRequest::new(ArgValue::Map(vec![])), &config)?;
        assert_eq!(r.plan, plan);
        Ok(())
    }

    #[test]
    fn test_fill_errors() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        // subset shape is checked even when the value is a map
        let value = ArgValue::map([("a", 1i64)]);
        assert!(matches!(
            na_error(fill(&plan, &FillRequest::new(value).subset(1i64), &config)),
            NaError::InvalidArgumentShape(_)
        ));
        assert!(matches!(
            na_error(fill(&plan, &FillRequest::new(vec![1i64]), &config)),
            NaError::InvalidArgumentValue(_)
        ));
        let value = ArgValue::map([("zz", ArgValue::from(vec![1i64]))]);
        assert!(matches!(
            na_error(fill(&plan, &FillRequest::new(value), &config)),
            NaError::InvalidArgumentValue(_)
        ));
        let value = ArgValue::map([("zz", 1i64)]);
        assert_eq!(
            na_error(fill(&plan, &FillRequest::new(value), &config)),
            NaError::UnresolvedColumn("\"zz\"".into())
        );
        Ok(())
    }

    #[test]
    fn test_replace_builds_chained_case() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let request = ReplaceRequest::new(ArgValue::map([
            (ArgValue::from(1i64), ArgValue::from(3i64)),
            (ArgValue::null(), ArgValue::from(0i64)),
            (ArgValue::from(2.5), ArgValue::from(4i64)),
        ]))
        .subset(["b"]);
        let r = replace(&plan, &request, &config)?;
        let exprs = projection_exprs(&r.plan);
        assert_eq!(exprs[0], col("a"));
        assert_eq!(
            exprs[1],
            when(col("b").eq(lit(1i64)), lit(3i64))
                .when(col("b").is_null(), lit(0i64))
                .otherwise(col("b"))
                .alias("\"b\"")
        );
        assert_eq!(exprs[2], col("c"));
        assert_eq!(r.skipped.len(), 1);
        assert_eq!(r.skipped[0].key, Some(LiteralValue::Float(2.5)));
        Ok(())
    }

    #[test]
    fn test_replace_all_pairs_skipped_passes_through() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let r = replace(
            &plan,
            &ReplaceRequest::new("x").value("y").subset(["b"]),
            &config,
        )?;
        assert_eq!(projection_exprs(&r.plan)[1], col("b"));
        assert_eq!(r.skipped.len(), 1);
        Ok(())
    }

    #[test]
    fn test_replace_null_value_and_default_subset() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let r = replace(&plan, &ReplaceRequest::new([1i64]), &config)?;
        let exprs = projection_exprs(&r.plan);
        match exprs[0].clone().unalias() {
            Expr::Case(Case { when_then_expr, .. }) => {
                assert_eq!(*when_then_expr[0].1, Expr::Literal(DataValue::Null))
            }
            other => panic!("expected case, got {other}"),
        }
        // a null replacement fits the utf8 column, the int key does not
        assert_eq!(exprs[2], col("c"));
        assert_eq!(r.skipped.len(), 1);
        Ok(())
    }

    #[test]
    fn test_replace_short_circuits_and_errors() -> Result<()> {
        let plan = scan()?;
        let config = ConfigOptions::new();
        let r = replace(
            &plan,
            &ReplaceRequest::new(1i64).subset(Vec::<String>::new()),
            &config,
        )?;
        assert_eq!(r.plan, plan);
        let r = replace(&plan, &ReplaceRequest::new(ArgValue::Map(vec![])), &config)?;
        assert_eq!(r.plan, plan);
        assert_eq!(
            na_error(replace(
                &plan,
                &ReplaceRequest::new([1i64, 2]).value([3i64]),
                &config
            )),
            NaError::LengthMismatch(2, 1)
        );
        assert_eq!(
            na_error(replace(
                &plan,
                &ReplaceRequest::new(1i64).value(2i64).subset("nope"),
                &config
            )),
            NaError::UnresolvedColumn("\"nope\"".into())
        );
        assert!(matches!(
            na_error(replace(
                &plan,
                &ReplaceRequest::new(1i64).subset(ArgValue::map([("a", "b")])),
                &config
            )),
            NaError::InvalidArgumentShape(_)
        ));
        Ok(())
    }

    /// counts warn events seen by the subscriber it is layered into
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(config: &ConfigOptions) -> Result<(usize, usize)> {
        let plan = scan()?;
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = Registry::default().with(WarnCounter(warnings.clone()));
        let r = tracing::subscriber::with_default(subscriber, || {
            fill(&plan, &FillRequest::new(1.5).subset(["b", "c"]), config)
        })?;
        Ok((r.skipped.len(), warnings.load(Ordering::SeqCst)))
    }

    #[test]
    fn test_warn_on_skipped() -> Result<()> {
        let mut config = ConfigOptions::new();
        assert_eq!(count_warnings(&config)?, (2, 2));
        config.set("na.warn_on_skipped", "false")?;
        // skipped replacements are still returned
        assert_eq!(count_warnings(&config)?, (2, 0));
        Ok(())
    }
}
