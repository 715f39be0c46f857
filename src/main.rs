use anyhow::Context;
use clap::Parser;
use loadscope::application::pipeline::Pipeline;
use loadscope::application::reporting::RunSummary;
use loadscope::config::{Config, LoadPolicy};
use loadscope::domain::run_report::RunOutcome;
use loadscope::infrastructure::render::JsonChartRenderer;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarize load-test monitoring results into scaling charts", long_about = None)]
struct Args {
    /// Directory holding results_<N>users.csv files (default: current directory)
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory for chart artifacts (default: the input directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Abort on the first unreadable result file instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Print the run report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for the report
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(input_dir) = args.input_dir {
        if args.output_dir.is_none() && std::env::var_os("LOADSCOPE_OUTPUT_DIR").is_none() {
            config.output_dir = input_dir.clone();
        }
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if args.fail_fast {
        config.load_policy = LoadPolicy::FailFast;
    }

    info!(
        "Analyzing {:?} (policy: {:?}, output: {:?})",
        config.input_dir, config.load_policy, config.output_dir
    );

    let pipeline = Pipeline::new(config, JsonChartRenderer::new());
    let outcome = pipeline.run().context("Run failed, no charts written")?;

    if args.json {
        println!("{}", RunSummary::to_json(&outcome)?);
    } else {
        RunSummary::print(&outcome);
    }

    if let RunOutcome::NoData { .. } = outcome {
        info!("Nothing to do");
    }
    Ok(())
}
