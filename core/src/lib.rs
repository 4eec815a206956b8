//! # Opaline Core
//!
//! Types shared by the Opaline crates: geometry descriptions, typed event
//! channels and profiling macros.

pub mod events;
pub mod geometry;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core version once at startup.
pub fn init() {
    log::info!("Opaline Core v{} initialized", VERSION);
}
