//! Logging helper
//!
//! Used by binaries and test harnesses to implement consistent logging

// Imports
use {
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::prelude::*,
};

/// Initializes logging.
///
/// Filtering comes from `RUST_LOG`, defaulting to `info`; colors can
/// be disabled with `RUST_LOG_COLOR`.
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init() {
	// Create the registry
	let registry = tracing_subscriber::registry();

	// Check if we should use colors
	let log_use_color = env::var("RUST_LOG_COLOR").map_or(true, |value| {
		matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
	});

	let filter = tracing_subscriber::EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy();
	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(log_use_color)
		.with_filter(filter);

	// Finally initialize it
	registry.with(layer).init();
}
