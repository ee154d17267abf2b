// AuditCrab - GPL-3.0-or-later
// Synthetic audit log generator for demos and fixtures

use anyhow::{Context, Result};
use auditcrab::synthetic;
use chrono::{Duration, Local};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "auditcrab-gen")]
#[command(version)]
#[command(about = "Write a synthetic audit log covering the last hour", long_about = None)]
struct Args {
    /// Output file; prints to stdout when omitted
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Number of lines to generate
    #[arg(short = 'n', long, default_value_t = 500)]
    count: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let base_time = (Local::now() - Duration::hours(1)).naive_local();
    let lines = synthetic::generate(args.count, args.seed, base_time);

    let mut text = lines.join("\n");
    text.push('\n');

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            tracing::info!("Wrote {} synthetic log lines to {}", lines.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
