/// `AuditCrab` - Batch anomaly triage for audit logs
///
/// Copyright (C) 2026 Daniel Freiermuth
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::{Context, Result};
use auditcrab::anomaly::{Alert, ClassifiedEvent, IsolationEnsemble};
use auditcrab::config::AnalysisConfig;
use auditcrab::core::{critical_timeline, Analysis, Analyzer, BatchSummary};
use auditcrab::parser;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "ram-profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser, Debug)]
#[command(name = "auditcrab")]
#[command(author = "AuditCrab Team")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Score audit log events for anomalies and raise alerts for critical ones", long_about = None)]
struct Args {
    /// Path to the audit log (`timestamp | ip | level | message` per line)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Config file; defaults to the user config directory
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Expected anomalous fraction, overrides the config file
    #[arg(long)]
    contamination: Option<f64>,

    /// Number of isolation trees, overrides the config file
    #[arg(long)]
    trees: Option<usize>,

    /// Random seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Points drawn per tree, overrides the config file
    #[arg(long)]
    subsample: Option<usize>,

    /// Score against a previously saved model instead of fitting a new one
    #[arg(long, value_name = "MODEL")]
    model: Option<PathBuf>,

    /// Save the fitted model as JSON
    #[arg(long, value_name = "MODEL_OUT")]
    save_model: Option<PathBuf>,

    /// Print the classified batch as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Path for the DHAT heap profiling output (only used when built with --features ram-profiling)
    #[cfg(feature = "ram-profiling")]
    #[arg(
        long = "profile-output",
        value_name = "PROFILE_FILE",
        default_value = "dhat-heap.json"
    )]
    profile_output: PathBuf,
}

impl Args {
    fn resolve_config(&self) -> AnalysisConfig {
        let mut config = self
            .config
            .as_deref()
            .map_or_else(AnalysisConfig::load, AnalysisConfig::load_from);

        if let Some(contamination) = self.contamination {
            config.contamination = Some(contamination);
        }
        if let Some(trees) = self.trees {
            config.num_trees = trees;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.subsample.is_some() {
            config.subsample_size = self.subsample;
        }
        config
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    threshold: Option<f64>,
    events: &'a [ClassifiedEvent],
    alerts: &'a [Alert],
}

fn print_text_report(analysis: &Analysis) {
    println!("Generating alerts for critical events:");
    for alert in &analysis.alerts {
        println!("{alert}");
    }
    println!();

    print!("{}", BatchSummary::from_classified(&analysis.classified));
    println!();

    let timeline = critical_timeline(&analysis.classified);
    if timeline.is_empty() {
        println!("No critical events to show.");
        return;
    }
    println!("Critical events over time:");
    for (n, event) in timeline.iter().enumerate() {
        println!(
            "  #{:<4} {}  {}",
            n + 1,
            event.event().formatted_timestamp(),
            event.event().source_ip
        );
    }
}

fn main() -> Result<()> {
    // Set RUST_LOG environment variable to override (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "AuditCrab starting up (version {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let args = Args::parse();

    #[cfg(feature = "ram-profiling")]
    let _profiler = {
        tracing::info!("RAM profiling enabled, output: {:?}", args.profile_output);
        dhat::Profiler::builder()
            .file_name(args.profile_output.clone())
            .build()
    };

    #[cfg(feature = "cpu-profiling")]
    {
        tracing::info!("CPU profiling enabled with Tracy - run Tracy profiler to connect");
    }

    let config = args.resolve_config();
    let analyzer = Analyzer::new(&config).context("Invalid analysis parameters")?;

    tracing::info!("Reading audit log {}", args.file.display());
    let parsed = parser::parse_file(&args.file)
        .with_context(|| format!("Cannot read log file {}", args.file.display()))?;
    tracing::info!(
        "Parsed {} events ({} lines skipped)",
        parsed.events.len(),
        parsed.skipped.len()
    );

    let analysis = match &args.model {
        Some(path) => {
            let model = IsolationEnsemble::load(path)?;
            analyzer.analyze_with_model(model, &parsed.events)
        }
        None => analyzer.analyze(&parsed.events),
    }
    .context("Anomaly analysis failed")?;

    if let Some(path) = &args.save_model {
        analysis.model.save(path)?;
    }

    if args.json {
        let report = JsonReport {
            threshold: analysis.threshold,
            events: &analysis.classified,
            alerts: &analysis.alerts,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Cannot serialize report")?
        );
    } else {
        print_text_report(&analysis);
    }

    Ok(())
}
