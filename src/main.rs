//! Command-line entry point: one run per invocation, driven by a YAML
//! configuration document.

use camino::Utf8PathBuf;
use clap::Parser;
use itertools::Itertools;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visitxy::pipeline;
use visitxy::RunConfig;

#[derive(Parser)]
#[command(
    name = "visitxy",
    about = "Assign catalog sources to visit footprints and compute visit-local pixel coordinates"
)]
struct Cli {
    /// Configuration file for this run
    #[arg(short = 'c', long = "config")]
    config: Utf8PathBuf,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match RunConfig::from_yaml_file(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("visitxy failed to load configuration: {error}");
            std::process::exit(1);
        }
    };

    match pipeline::run(&config) {
        Ok(report) => {
            if !report.fully_projected() {
                for skipped in &report.skipped {
                    eprintln!(
                        "visit {} skipped during projection: {}",
                        skipped.visit, skipped.reason
                    );
                }
                eprintln!(
                    "skipped visits: {}",
                    report.skipped.iter().map(|s| s.visit).join(", ")
                );
            }
            println!(
                "visitxy completed successfully: {} sources, {} assigned, {} unassigned, {} visits projected, {} skipped",
                report.n_sources,
                report.n_assigned,
                report.n_unassigned,
                report.projected.len(),
                report.skipped.len()
            );
        }
        Err(error) => {
            println!("visitxy failed: {error}");
            std::process::exit(1);
        }
    }
}
