//! Basic logger usage example
//!
//! Demonstrates a single-sink logger built from options, verbosity levels,
//! stack-trace capture and live level changes.
//!
//! Run with: cargo run --example basic_usage

use rust_tee_logger::prelude::*;
use rust_tee_logger::{error, fields, info, v_info};

fn main() -> Result<()> {
    println!("=== Rust Tee Logger - Basic Usage Example ===\n");

    // Keep a handle on the level to change it later
    let level = AtomicLevel::new(LogLevel::INFO);
    let logger = new_raw(
        Options::new()
            .write_to(std::io::stdout())
            .level(level.clone())
            .time_encoder(TimestampFormat::Iso8601),
    )?;
    let log = LogHandle::new(logger).with_name("example");

    println!("1. Logging at the default level:");
    info!(log, "application started", "version" => env!("CARGO_PKG_VERSION"));
    v_info!(log, 1, "debug detail (hidden)");

    println!("\n2. Raising verbosity at runtime:");
    level.set_level(LogLevel::verbosity(2));
    v_info!(log, 1, "debug detail (visible)");
    v_info!(log, 2, "verbosity 2 detail (visible)", "cache" => "pods");
    v_info!(log, 3, "verbosity 3 detail (hidden)");

    println!("\n3. Errors carry a stack trace:");
    let err = LoggerError::other("connection refused");
    error!(log, err, "unable to reach API server", "attempt" => 3);

    println!("\n4. Scoped handles:");
    let scoped = log.with_values(&fields!("controller" => "memcached"));
    scoped.info("reconciling", &fields!("request" => "default/memcached-sample"));

    log.sync()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
