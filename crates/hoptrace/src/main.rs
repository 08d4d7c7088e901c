#![forbid(unsafe_code)]

use clap::Parser;
use config::{Args, HoptraceConfig};

mod app;
mod config;
mod privilege;
mod report;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = HoptraceConfig::try_from(args)?;
    app::run_hoptrace(&cfg)
}
