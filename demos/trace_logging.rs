//! Trace-aware logging example
//!
//! Demonstrates mirroring records into spans, switching spans between calls
//! and tracer diagnostics routed through the factory.
//!
//! Run with: cargo run --example trace_logging

use rust_trace_logger::prelude::*;
use rust_trace_logger::trace::{global, new_tracer};
use std::sync::Arc;

fn handle_request(logger: &Factory, ctx: &TraceContext, order_id: i64) {
    let (ctx, span) = start_span(ctx, "handle_request", &Fields::new().with_field("order_id", order_id));

    logger
        .trace(&ctx)
        .info_with("Order received", Fields::new().with_field("order_id", order_id));

    let (db_ctx, db_span) = start_span(&ctx, "db.query", &Fields::new().with_field("db.system", "postgres"));
    logger.trace(&db_ctx).debug("Loading order lines");
    if order_id % 2 == 0 {
        logger.trace(&db_ctx).error("Query timed out");
    }
    db_span.finish();

    logger.trace(&ctx).info("Order handled");
    span.finish();
}

fn main() -> Result<()> {
    println!("=== Rust Trace Logger - Trace Logging Example ===\n");

    let logger = Factory::new_std("debug");

    let tracer = new_tracer("order-service", &logger)?;
    global::set_tracer(Arc::new(tracer.clone()));

    for order_id in 1..=2 {
        handle_request(&logger, &TraceContext::background(), order_id);
    }

    println!("\nRecorded spans:");
    for span in tracer.finished_spans() {
        let context = span.context();
        println!(
            "  {} trace={} span={} parent={} events={} errored={}",
            span.operation_name(),
            context.trace_id,
            context.span_id,
            context.parent_span_id.as_deref().unwrap_or("-"),
            span.events().len(),
            span.is_errored()
        );
    }

    tracer.close();
    global::reset_tracer();
    logger.flush()?;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
