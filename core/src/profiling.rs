//! Profiling utilities for join normalization.
//!
//! This module provides integration with the puffin profiler to track
//! flattening and rehydration cost when the "profiling" feature is enabled.

/// Re-export puffin macros for convenience
#[cfg(feature = "profiling")]
pub use puffin::{profile_function, profile_scope};

/// Generic profiling scope macro for high-level operation instrumentation.
#[macro_export]
macro_rules! joinery_profile_scope {
    ($category:literal, $operation:literal) => {
        #[cfg(feature = "profiling")]
        ::puffin::profile_scope!($category, $operation);
    };
}

/// Generic profiling function marker.
#[macro_export]
macro_rules! joinery_profile_function {
    () => {
        #[cfg(feature = "profiling")]
        ::puffin::profile_function!();
    };
}
