use anyhow::Result;
use narewrite::common::schema::{Field, Schema};
use narewrite::common::types::{DataType, DataValue};
use narewrite::na::args::ArgValue;
use narewrite::na::{DropRequest, FillRequest, ReplaceRequest};
use narewrite::session::SessionContext;
use narewrite::storage::memory::MemTable;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("starting the na demo...");

    let schema = Arc::new(Schema::try_new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("score", DataType::Float64, true),
        Field::new("name", DataType::Utf8, true),
    ])?);
    let rows = vec![
        vec![
            DataValue::Int32(Some(1)),
            DataValue::Float64(Some(1.5)),
            DataValue::Utf8(Some("ann".into())),
        ],
        vec![
            DataValue::Int32(Some(2)),
            DataValue::Float64(Some(f64::NAN)),
            DataValue::Utf8(None),
        ],
        vec![
            DataValue::Int32(Some(3)),
            DataValue::Float64(None),
            DataValue::Utf8(Some("bob".into())),
        ],
    ];
    let session = SessionContext::new();
    session.register_table("scores", Arc::new(MemTable::try_new(schema, rows)?))?;
    let df = session.table("scores")?;
    println!("source:\n{}", df.collect()?);

    let dropped = df.na().drop(&DropRequest::new().how("any"))?;
    println!("{:?}\n{}", dropped.df.logical_plan(), dropped.df.collect()?);

    let filled = df.na().fill(&FillRequest::new(ArgValue::map([
        ("score", ArgValue::from(0i64)),
        ("name", ArgValue::from("unknown")),
    ])))?;
    println!("{:?}\n{}", filled.df.logical_plan(), filled.df.collect()?);

    let replaced = df
        .na()
        .replace(&ReplaceRequest::new([1i64, 2]).value([10i64, 20]).subset(["id", "name"]))?;
    for skipped in &replaced.skipped {
        println!("skipped: {skipped}");
    }
    println!("{:?}\n{}", replaced.df.logical_plan(), replaced.df.collect()?);
    Ok(())
}
