//! Basic factory usage example
//!
//! Demonstrates level gating, runtime level changes and child factories that
//! share one output.
//!
//! Run with: cargo run --example basic_usage

use rust_trace_logger::prelude::*;
use rust_trace_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Trace Logger - Basic Usage Example ===\n");

    let options = LoggerOptions::new()
        .with_encoding(Encoding::Console)
        .with_caller(true)
        .with_colors(true);
    let logger = Factory::new_console("debug", options);

    println!("1. Logging at different levels:");
    logger.normal().debug("This is a debug message");
    logger.normal().info("This is an info message");
    logger.normal().warn("This is a warning message");
    logger.normal().error("This is an error message");

    println!("\n2. Structured fields and formatting macros:");
    logger.normal().info_with(
        "User logged in",
        Fields::new()
            .with_field("user_id", 42)
            .with_field("method", "password"),
    );
    info!(logger.normal(), "Listening on port {}", 8080);

    println!("\n3. Raising the level at runtime (level: warn):");
    logger.set_level("warn");
    logger.normal().debug("Debug message (hidden)");
    logger.normal().info("Info message (hidden)");
    warn!(logger.normal(), "Queue depth {} above threshold", 512);

    println!("\n4. Child factories keep their own level:");
    let child = logger.with([field("component", "scheduler")]);
    child.set_level("debug");
    child.normal().debug("Child debug message (visible)");
    logger.normal().debug("Parent debug message (hidden)");
    println!("   parent level = {}, child level = {}", logger.level(), child.level());

    println!("\n5. Unknown level names fall back to info:");
    logger.set_level("verbose");
    println!("   level after set_level(\"verbose\") = {}", logger.level());

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
