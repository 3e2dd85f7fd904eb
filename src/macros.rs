//! Logging macros with `format!`-style arguments.
//!
//! Each macro takes anything implementing [`Log`](crate::Log): a
//! [`PlainLogger`](crate::PlainLogger) from `Factory::normal` or the
//! `&dyn Log` returned by `Factory::trace`. The level macros skip formatting
//! entirely when the level is disabled.
//!
//! # Examples
//!
//! ```
//! use rust_trace_logger::prelude::*;
//! use rust_trace_logger::{info, warn};
//!
//! let factory = Factory::new_std("info");
//! let port = 8080;
//! info!(factory.normal(), "listening on port {}", port);
//! warn!(factory.trace(&TraceContext::background()), "no span for request {}", "r-1");
//! ```

/// Log at an explicit level.
///
/// Unlike the level macros this always formats, because `Panic` and `Fatal`
/// escape even when filtered.
///
/// ```
/// # use rust_trace_logger::prelude::*;
/// # let factory = Factory::new_std("info");
/// use rust_trace_logger::log;
/// log!(factory.normal(), LogLevel::Error, "status {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.log($level, &format!($($arg)+))
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_enabled {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.emit(level, &format!($($arg)+), $crate::Fields::new());
        }
    }};
}

/// Log a debug-level message.
///
/// ```
/// # use rust_trace_logger::prelude::*;
/// # let factory = Factory::new_std("debug");
/// use rust_trace_logger::debug;
/// debug!(factory.normal(), "cache size {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_enabled!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_enabled!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warn-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_enabled!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use rust_trace_logger::prelude::*;
/// # let factory = Factory::new_std("info");
/// use rust_trace_logger::error;
/// error!(factory.normal(), "request {} failed: {}", 7, "timeout");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_enabled!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
