use anyhow::Context;
use chrono::Utc;
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::utils::print_samples;
use crate::cli::OutputFormat;
use crate::config;
use crate::vpn::probe::{parse_dump as parse_wg_dump, probe_with_timeout, WgProbe};
use crate::vpn::{ConnectivityProbe, DumpFileProbe, PeerSample};

#[derive(Args)]
pub struct ParseDumpArgs {
    #[arg(help = "Dump file; reads stdin when omitted")]
    pub file: Option<PathBuf>,
}

pub async fn parse_dump(args: ParseDumpArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let samples = match &args.file {
        Some(path) => DumpFileProbe::new(path)
            .probe()
            .await
            .with_context(|| format!("failed to parse {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            parse_wg_dump(&buf)?
        }
    };

    print_samples(&output_format, &with_liveness(samples))
}

pub async fn probe(output_format: OutputFormat) -> anyhow::Result<()> {
    let monitor = &config::config().monitor;
    let probe = WgProbe::from_config(monitor);

    let samples = probe_with_timeout(&probe, monitor.probe_timeout())
        .await
        .with_context(|| format!("probe of interface {} failed", monitor.interface))?;

    print_samples(&output_format, &with_liveness(samples))
}

fn with_liveness(mut samples: Vec<PeerSample>) -> Vec<PeerSample> {
    let now = Utc::now();
    let timeout = config::config().monitor.handshake_timeout();
    for sample in &mut samples {
        sample.refresh_liveness(now, timeout);
    }
    samples
}
