#![deny(clippy::all)]

/**
 * Templating CLI
 *
 * Loads directive registrations and compiles template files.
 */
pub use templating;

pub mod compile;
pub mod config;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
