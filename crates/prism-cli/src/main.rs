//! CLI entry point for the Prism query console.
//!
//! Runs a Cypher statement against the Neo4j Query API (or projects a saved
//! response body read from stdin) and writes the result as JSON to stdout.

use std::io::Read;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use prism_cli::output::{select_view, write_json, View};
use prism_core::AppConfig;
use prism_query::{interpret_body, QueryClient, QueryReply};

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Query console for Neo4j graphs: graph and table views of a Cypher result")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: prism).
    #[arg(short, long, default_value = "prism", global = true)]
    config: String,

    /// Which projection to print.
    #[arg(long, value_enum, default_value_t = View::Both, global = true)]
    view: View,

    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run one Cypher statement (read from stdin when omitted).
    Run {
        /// Cypher statement text.
        statement: Option<String>,
    },
    /// Project a saved Query API response body read from stdin.
    Project,
    /// Print the configured UI layout defaults.
    Layout,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let mut stdout = std::io::stdout().lock();

    let reply = match cli.command {
        Command::Run { statement } => {
            let statement = match statement {
                Some(s) => s,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let statement = statement.trim();
            if statement.is_empty() {
                anyhow::bail!("no Cypher statement given");
            }
            let client = QueryClient::new(&config.query)?;
            client.execute_reply(statement).await
        }
        Command::Project => {
            let mut body = Vec::new();
            std::io::stdin().read_to_end(&mut body)?;
            QueryReply::from(interpret_body(&body))
        }
        Command::Layout => {
            write_json(&mut stdout, &config.layout, cli.pretty)?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    write_json(&mut stdout, &select_view(&reply, cli.view)?, cli.pretty)?;
    Ok(if reply.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
