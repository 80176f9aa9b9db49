//! Tracing utilities for join registration and row normalization.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event when a relation path is registered.
///
/// ```ignore
/// joinery_trace_include!("post.category", JoinMode::Left);
/// ```
#[macro_export]
macro_rules! joinery_trace_include {
    ($path:expr, $mode:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(path = %$path, mode = %$mode, "joinery.include");
    };
}

/// Emit a debug-level tracing event before the underlying query runs.
#[macro_export]
macro_rules! joinery_trace_execute {
    ($model:expr, $paths:expr, $rehydrate:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            model = %$model,
            paths = $paths,
            rehydrate = $rehydrate,
            "joinery.execute"
        );
    };
}

/// Emit a debug-level tracing event for each normalization pass.
///
/// ```ignore
/// joinery_trace_normalize!("many", &path, rows.len());
/// ```
#[macro_export]
macro_rules! joinery_trace_normalize {
    ($pass:literal, $path:expr, $rows:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(pass = $pass, path = %$path, rows = $rows, "joinery.normalize");
    };
}
