//! Selecting and printing the projection the user asked for.

use std::io::Write;

use clap::ValueEnum;
use prism_query::QueryReply;
use serde::Serialize;
use serde_json::Value;

/// Which projection to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum View {
    Graph,
    Table,
    #[default]
    Both,
}

/// JSON document for `reply` restricted to `view`. Failures print as is.
pub fn select_view(reply: &QueryReply, view: View) -> serde_json::Result<Value> {
    match (reply, view) {
        (QueryReply::Success(outcome), View::Graph) => serde_json::to_value(&outcome.graph),
        (QueryReply::Success(outcome), View::Table) => serde_json::to_value(&outcome.table),
        (reply, _) => serde_json::to_value(reply),
    }
}

/// Write `value` followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
