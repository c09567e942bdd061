//! The `Logger` seam shared by providers, the repair engine and the orchestrator

use std::sync::Arc;

/// Sink for the crate's diagnostic output
///
/// The crate never picks a logging backend itself. Builders, models and the
/// repair engine take a [`SharedLogger`] and default to `NoOpLogger`; an
/// editor integration passes its own implementation to route lines into the
/// host's output window. `MemoryLogger` captures lines for tests.
pub trait Logger: Send + Sync {
    /// Request/response traces and skipped-repair reasons
    fn debug(&self, message: &str);

    fn info(&self, message: &str);

    /// Retries and user-visible repair failures
    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Logger handle cloned into every model and background fix task
pub type SharedLogger = Arc<dyn Logger>;

/// `format_args!` entry points used by the `log_*!` macros
pub trait LoggerExt: Logger {
    fn debug_fmt(&self, args: std::fmt::Arguments<'_>) {
        self.debug(&args.to_string());
    }

    fn info_fmt(&self, args: std::fmt::Arguments<'_>) {
        self.info(&args.to_string());
    }

    fn warn_fmt(&self, args: std::fmt::Arguments<'_>) {
        self.warn(&args.to_string());
    }

    fn error_fmt(&self, args: std::fmt::Arguments<'_>) {
        self.error(&args.to_string());
    }
}

impl<T: Logger + ?Sized> LoggerExt for T {}

/// `log_debug!(self.logger, "[{}] chunk: {}", provider, text)`
///
/// Accepts a logger value, a reference or a [`SharedLogger`].
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::logging::LoggerExt as _;
        $logger.debug_fmt(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::logging::LoggerExt as _;
        $logger.info_fmt(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::logging::LoggerExt as _;
        $logger.warn_fmt(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::logging::LoggerExt as _;
        $logger.error_fmt(format_args!($($arg)*))
    }};
}
