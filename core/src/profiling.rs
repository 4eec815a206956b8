//! Profiling support via Tracy.
//!
//! Instrumentation is compiled in only with the `profiling` Cargo feature:
//!
//! ```toml
//! [dependencies]
//! opaline-core = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! Program generation is the main client: every build step of a program
//! opens a scope, so shader synthesis and pipeline finalization show up as
//! separate zones in Tracy.
//!
//! ```ignore
//! use opaline_core::{profile_function, profile_scope};
//!
//! fn generate() {
//!     profile_function!();
//!
//!     {
//!         profile_scope!("resolve_variables");
//!         // ...
//!     }
//! }
//! ```
//!
//! With the feature disabled every macro expands to nothing.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, Span, plot as tracy_plot, span};

/// Create a profiling span for the current scope.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Plot a value over time in Tracy.
///
/// ```ignore
/// profile_plot!("cached_pipelines", manager.pipeline_count());
/// ```
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

/// Send a message to Tracy's message log.
///
/// Used for events worth spotting on the timeline, such as a program
/// falling back to its fallback shaders.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_message {
    ($msg:expr) => {
        if let Some(client) = $crate::profiling::Client::running() {
            client.message($msg, 0);
        }
    };
}

/// Send a message (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_message {
    ($msg:expr) => {};
}

pub use profile_function;
pub use profile_message;
pub use profile_plot;
pub use profile_scope;

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand_without_feature() {
        fn instrumented() -> u32 {
            crate::profile_function!();
            crate::profile_scope!("inner");
            crate::profile_plot!("value", 3);
            crate::profile_message!("message");
            7
        }

        assert_eq!(instrumented(), 7);
    }
}
