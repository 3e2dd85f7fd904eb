//! Tracer configuration read from the process environment

use super::adapter::TracerLogAdapter;
use super::memory::MemoryTracer;
use crate::core::error::{LoggerError, Result};
use crate::core::fields::Fields;
use crate::factory::Factory;
use std::sync::Arc;

pub const ENV_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";
pub const ENV_RESOURCE_ATTRIBUTES: &str = "OTEL_RESOURCE_ATTRIBUTES";
pub const ENV_SDK_DISABLED: &str = "OTEL_SDK_DISABLED";

/// Default number of spans a [`MemoryTracer`] keeps for inspection.
pub const DEFAULT_MAX_SPANS: usize = 1024;

/// Settings applied by a tracer when it starts root spans.
#[derive(Debug, Clone, PartialEq)]
pub struct TracerConfig {
    pub service_name: Option<String>,

    /// Attributes tagged on every root span
    pub resource_attributes: Fields,

    /// When set, the tracer hands out no-op spans
    pub disabled: bool,

    /// Spans retained by a recording tracer; the oldest is dropped first
    pub max_spans: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            resource_attributes: Fields::new(),
            disabled: false,
            max_spans: DEFAULT_MAX_SPANS,
        }
    }
}

impl TracerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = lookup(ENV_SERVICE_NAME)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let resource_attributes = match lookup(ENV_RESOURCE_ATTRIBUTES) {
            Some(raw) => parse_resource_attributes(&raw)?,
            None => Fields::new(),
        };

        let disabled = match lookup(ENV_SDK_DISABLED) {
            Some(raw) => parse_bool(ENV_SDK_DISABLED, &raw)?,
            None => false,
        };

        Ok(Self {
            service_name,
            resource_attributes,
            disabled,
            ..Self::default()
        })
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn with_max_spans(mut self, max_spans: usize) -> Self {
        self.max_spans = max_spans;
        self
    }
}

fn parse_resource_attributes(raw: &str) -> Result<Fields> {
    let mut fields = Fields::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            LoggerError::config(
                ENV_RESOURCE_ATTRIBUTES,
                format!("expected key=value, got '{}'", pair),
            )
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(LoggerError::config(
                ENV_RESOURCE_ATTRIBUTES,
                format!("empty key in '{}'", pair),
            ));
        }
        fields.add_field(key, value.trim());
    }
    Ok(fields)
}

fn parse_bool(variable: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(LoggerError::config(
            variable,
            format!("expected true or false, got '{}'", other),
        )),
    }
}

/// Create a tracer for `service_name`, configured from the environment, that
/// reports its diagnostics through `factory`'s plain logger.
///
/// An empty `service_name` keeps whatever the environment provides. The
/// tracer retains the last [`DEFAULT_MAX_SPANS`] spans for inspection.
pub fn new_tracer(service_name: &str, factory: &Factory) -> Result<MemoryTracer> {
    let mut config = TracerConfig::from_env()?;
    if !service_name.is_empty() {
        config = config.with_service_name(service_name);
    }
    let adapter = TracerLogAdapter::new(factory.normal().clone());
    Ok(MemoryTracer::with_config(config, Some(Arc::new(adapter))))
}
