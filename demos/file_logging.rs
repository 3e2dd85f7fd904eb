//! File logging example
//!
//! Demonstrates JSON logging to a size-rotated, compressed file and building a
//! factory from a configuration document.
//!
//! Run with: cargo run --example file_logging

use rust_trace_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Trace Logger - File Logging Example ===\n");

    println!("1. Logging to logs/application.log:");
    let logger = Factory::new_file_logger("logs/application.log", "debug")?;

    logger.normal().info("Application started");
    logger.normal().debug("Loading configuration...");
    logger.normal().warn("Using default settings for some options");

    let db = logger.with([field("component", "database")]);
    db.normal().info("Connecting to database...");
    db.normal()
        .error_with("Connection attempt failed", Fields::new().with_field("attempt", 1));
    db.normal().info("Database connection established");
    logger.flush()?;

    println!("\n2. Factory built from configuration (rotates at 1 MB, keeps 3 gzip backups):");
    let config = LoggerConfig::from_json(
        r#"{
            "level": "info",
            "destination": {
                "type": "file",
                "path": "logs/rotating.log",
                "max_size_mb": 1,
                "compress": true,
                "max_backups": 3
            },
            "timestamp_format": "rfc3339"
        }"#,
    )?;
    let rotating = Factory::from_config(&config)?;

    for i in 0..20_000 {
        rotating.normal().info_with(
            "Processing batch",
            Fields::new()
                .with_field("batch", i)
                .with_field("status", "ok"),
        );
    }
    rotating.flush()?;

    let metrics = rotating.metrics();
    println!(
        "   records written: {}, write failures: {}",
        metrics.records_written(),
        metrics.write_failures()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check logs/ for application.log, rotating.log and rotating.log.<n>.gz");

    Ok(())
}
