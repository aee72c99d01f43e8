/// Hourly VWAP reports from an ITCH 5.0 feed capture
///
/// Memory-maps the input feed and runs the single-pass engine, writing one
/// report file per emission into the output directory. mmap keeps the
/// multi-gigabyte input out of process memory and off the syscall path.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use tracing::info;

use itch_vwap::{Engine, VwapReport, HOUR_NS};

#[derive(Parser, Debug)]
#[command(name = "itch-vwap", version, about = "Hourly VWAP from an ITCH 5.0 feed capture")]
struct Cli {
    /// Input ITCH file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for hourly report files
    #[arg(short, long)]
    output: PathBuf,
}

fn hour_of(timestamp: u64) -> u64 {
    timestamp / HOUR_NS
}

fn write_report(dir: &Path, report: &VwapReport) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{:02}.txt", hour_of(report.timestamp)));
    let mut out = File::create(&path)?;
    writeln!(out, "VWAP at {}", report.timestamp)?;
    for row in &report.rows {
        writeln!(out, "{} {}", row.symbol, row.vwap)?;
    }
    writeln!(out, "-----------------")?;
    Ok(path)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("create output directory {:?}", cli.output))?;

    let file = File::open(&cli.input).with_context(|| format!("open input {:?}", cli.input))?;
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("map input {:?}", cli.input))?;

    let mut engine = Engine::new();
    let mut write_result: std::io::Result<()> = Ok(());
    let summary = engine.process(&mmap, |report| {
        if write_result.is_ok() {
            write_result = write_report(&cli.output, report).map(|path| {
                info!("{:02}:00  wrote {:?}", hour_of(report.timestamp), path);
            });
        }
    })?;
    write_result.context("write report file")?;

    println!("number of messages = {}", summary.messages);
    Ok(())
}
