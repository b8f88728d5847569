//! Controller manager bootstrap example
//!
//! Builds the console plus file logger from command-line flags, installs it
//! process-wide and logs through a propagated operation context.
//!
//! Run with: cargo run --example controller_manager -- --log-level 2

use clap::Parser;
use rust_tee_logger::prelude::*;
use rust_tee_logger::{fields, info};
use std::fs::OpenOptions;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The address the metric endpoint binds to
    #[arg(long, default_value = ":8080")]
    metrics_bind_address: String,

    /// The address the probe endpoint binds to
    #[arg(long, default_value = ":8081")]
    health_probe_bind_address: String,

    /// Enable leader election for controller manager
    #[arg(long)]
    leader_elect: bool,

    /// The namespace that the manager targeted
    #[arg(long, default_value = "")]
    namespace: String,

    /// File receiving a copy of every entry
    #[arg(long, default_value = "controller.log")]
    log_file: PathBuf,

    #[command(flatten)]
    log: LogFlags,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let logfile = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)
        .map_err(|e| {
            let message = format!("{}: {}", args.log_file.display(), e);
            LoggerError::io_operation("opening log file", message, e)
        })?;

    let handle = new_tee_logger_with(logfile, &args.log)?;
    set_logger(handle);

    let ctx = OperationContext::new();
    let log = from_context(&ctx);
    info!(log, "sample", "key" => "value");

    log.with_name("setup").info(
        "starting manager",
        &fields!(
            "metrics-bind-address" => args.metrics_bind_address.as_str(),
            "health-probe-bind-address" => args.health_probe_bind_address.as_str(),
            "leader-elect" => args.leader_elect,
            "namespace" => args.namespace.as_str(),
        ),
    );

    log.sync()?;

    // Dropping the last handles closes the log file
    drop(log);
    drop(set_logger(LogHandle::discard()));

    Ok(())
}
