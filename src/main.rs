use anyhow::{Context, Result};
use clap::Parser;
use datemscraper::{
    fetch::{StatusClient, DATEM_STATUS_URL},
    run::{run, TracingReporter},
    table::{read_input, write_records},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Look up DATEM status for each CE/BL pair in a CSV and export the flattened results"
)]
struct Args {
    /// Input CSV with CE and BL columns.
    #[arg(long)]
    input: PathBuf,
    /// Where to write the result CSV.
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let args = Args::parse();

    // ─── 2) load input rows ──────────────────────────────────────────
    let rows = read_input(&args.input)?;
    info!(rows = rows.len(), input = %args.input.display(), "input loaded");

    // ─── 3) fetch + flatten, one row at a time ───────────────────────
    let client = StatusClient::new(DATEM_STATUS_URL).context("building status client")?;
    let mut reporter = TracingReporter::new(rows.len());
    let records = run(&client, &rows, &mut reporter);

    // ─── 4) write the output table ───────────────────────────────────
    write_records(&args.output, &records)?;
    info!(output = %args.output.display(), "results saved");

    Ok(())
}
