//! Stress tests for concurrent emission
//!
//! These tests verify:
//! - Concurrent emission never produces torn lines on a file sink
//! - The sampler burst limit stays exact under contention
//! - Level changes while other threads emit are safe

use rust_tee_logger::core::encoder::decode_json_line;
use rust_tee_logger::core::{EncoderConfig, SharedBuffer, TimestampFormat};
use rust_tee_logger::pipeline::{default_stacktrace_level, file_options, new_tee};
use rust_tee_logger::{AtomicLevel, LogContext, LogFlags, LogHandle, LogLevel, Options};
use std::fs::{self, File};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;

#[test]
fn test_concurrent_emission_has_no_torn_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");
    let file = File::create(&log_file).expect("Failed to create log file");
    let console = SharedBuffer::new();

    // Verbose level disables sampling so every entry is written
    let flags = LogFlags {
        level: Some(LogLevel::DEBUG),
        ..LogFlags::default()
    };
    let logger = new_tee(
        Options::new().write_to(console.clone()),
        file_options(file, AtomicLevel::default(), default_stacktrace_level()),
        &flags,
    )
    .expect("Failed to build tee");
    let log = LogHandle::new(logger);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let log = log.with_values(&LogContext::new().with_field("worker", t));
            thread::spawn(move || {
                for i in 0..250 {
                    let payload = "x".repeat(100 + (i % 7) * 50);
                    log.info(
                        format!("worker {} entry {}", t, i),
                        &LogContext::new().with_field("payload", payload),
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Worker panicked");
    }
    log.sync().expect("Failed to sync");

    let config = EncoderConfig {
        time_format: TimestampFormat::Rfc3339,
        ..EncoderConfig::production()
    };
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * 250);
    for line in lines {
        decode_json_line(line, &config).unwrap_or_else(|e| panic!("torn line {:?}: {}", line, e));
    }
    assert_eq!(console.lines().len(), THREADS * 250);
}

#[test]
fn test_sampler_exact_under_contention() {
    let buffer = SharedBuffer::new();
    let logger = rust_tee_logger::new_raw(Options::new().write_to(buffer.clone()))
        .expect("Failed to build logger");
    let logger = Arc::new(logger);

    // 8 x 125 = 1000 identical entries, well inside one 1s window
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for _ in 0..125 {
                    logger.info("requeue after conflict");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Worker panicked");
    }

    assert_eq!(buffer.lines().len(), 109);
    assert_eq!(logger.metrics().written_count(), 109);
    assert_eq!(logger.metrics().rejected_count(), 891);
}

#[test]
fn test_level_changes_during_emission() {
    let buffer = SharedBuffer::new();
    let level = AtomicLevel::new(LogLevel::DEBUG);
    let logger = rust_tee_logger::new_raw(
        Options::new()
            .write_to(buffer.clone())
            .level(level.clone()),
    )
    .expect("Failed to build logger");
    let logger = Arc::new(logger);
    let running = Arc::new(AtomicBool::new(true));

    let toggler = {
        let level = level.clone();
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut verbose = false;
            while running.load(Ordering::Relaxed) {
                level.set_level(if verbose { LogLevel::DEBUG } else { LogLevel::ERROR });
                verbose = !verbose;
                thread::yield_now();
            }
        })
    };

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..500 {
                    logger.debug(format!("debug {} {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Worker panicked");
    }
    running.store(false, Ordering::Relaxed);
    toggler.join().expect("Toggler panicked");

    let metrics = logger.metrics();
    assert_eq!(metrics.written_count() + metrics.rejected_count(), 2000);
    assert_eq!(buffer.lines().len() as u64, metrics.written_count());
}
