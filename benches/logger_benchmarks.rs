//! Criterion benchmarks for rust_trace_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_trace_logger::prelude::*;
use rust_trace_logger::trace::NoopTracer;
use rust_trace_logger::{Record, RecordEncoder, Sink};
use std::sync::Arc;

/// Discards records so only encoding and dispatch are measured.
struct NullSink;

impl Sink for NullSink {
    fn write(&self, record: &[u8]) -> Result<()> {
        black_box(record);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn null_factory(level: &str, options: LoggerOptions) -> Factory {
    Factory::with_sink(Arc::new(NullSink), level, options)
}

// ============================================================================
// Factory Benchmarks
// ============================================================================

fn bench_factory_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("factory_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("with_sink", |b| {
        b.iter(|| black_box(null_factory("info", LoggerOptions::default())));
    });

    let root = null_factory("info", LoggerOptions::default());
    group.bench_function("with_child", |b| {
        b.iter(|| black_box(root.with([field("component", "bench")])));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_plain_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_logging");
    group.throughput(Throughput::Elements(1));

    let json = null_factory("debug", LoggerOptions::default());
    group.bench_function("json", |b| {
        b.iter(|| json.normal().info(black_box("Plain message")));
    });

    let with_caller = null_factory("debug", LoggerOptions::new().with_caller(true));
    group.bench_function("json_with_caller", |b| {
        b.iter(|| with_caller.normal().info(black_box("Plain message")));
    });

    let console = null_factory("debug", LoggerOptions::new().with_encoding(Encoding::Console));
    group.bench_function("console", |b| {
        b.iter(|| console.normal().info(black_box("Plain message")));
    });

    let child = json.with([field("service", "api"), field("region", "eu-1")]);
    group.bench_function("json_with_fields", |b| {
        b.iter(|| {
            child
                .normal()
                .info_with(black_box("Plain message"), Fields::new().with_field("n", 1))
        });
    });

    group.finish();
}

fn bench_trace_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_logging");
    group.throughput(Throughput::Elements(1));

    let factory = null_factory("info", LoggerOptions::default());
    let background = TraceContext::background();
    group.bench_function("no_span", |b| {
        b.iter(|| factory.trace(&background).info(black_box("Traced message")));
    });

    let span: SpanHandle = NoopTracer.start_span("bench", None);
    let ctx = TraceContext::from(span);
    group.bench_function("noop_span", |b| {
        b.iter(|| factory.trace(&ctx).info(black_box("Traced message")));
    });

    group.finish();
}

// ============================================================================
// Concurrency Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let factory = Arc::new(null_factory("info", LoggerOptions::default()));

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let factory = Arc::clone(&factory);
                    std::thread::spawn(move || {
                        factory.normal().info(black_box("Concurrent message"));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.bench_function("set_level", |b| {
        b.iter(|| factory.set_level(black_box("warn")));
    });

    group.finish();
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let record = Record::new(LogLevel::Info, "Test message").with_fields(
        Fields::new()
            .with_field("user_id", 42)
            .with_field("action", "login"),
    );

    let json = RecordEncoder::new(LoggerOptions::default());
    group.bench_function("json", |b| {
        b.iter(|| black_box(json.encode(black_box(&record)).unwrap()));
    });

    let console = RecordEncoder::new(LoggerOptions::new().with_encoding(Encoding::Console));
    group.bench_function("console", |b| {
        b.iter(|| black_box(console.encode(black_box(&record)).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let factory = null_factory("warn", LoggerOptions::default());

    group.bench_function("below_threshold", |b| {
        b.iter(|| factory.normal().debug(black_box("This should be filtered")));
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| factory.normal().error(black_box("This should be logged")));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_factory_creation,
    bench_plain_logging,
    bench_trace_logging,
    bench_concurrent_logging,
    bench_encoding,
    bench_level_filtering
);

criterion_main!(benches);
