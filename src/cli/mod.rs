pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ispctl")]
#[command(about = "ispctl - operator tooling for the ISP management core")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Parse a captured `wg show <interface> dump` (stdin when no file)")]
    ParseDump(commands::dump::ParseDumpArgs),

    #[command(about = "Run the live VPN probe once")]
    Probe,

    #[command(about = "Run one reconciliation pass against the configured database")]
    Reconcile,

    #[command(about = "Evaluate the permission resolver for a role")]
    Can(commands::can::CanArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::ParseDump(args) => commands::dump::parse_dump(args, output_format).await,
        Commands::Probe => commands::dump::probe(output_format).await,
        Commands::Reconcile => commands::reconcile::handle(output_format).await,
        Commands::Can(args) => commands::can::handle(args, output_format),
    }
}
