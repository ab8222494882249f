//! Browser console logging through `tracing-wasm`.
//!
//! Installed once from the wasm start hook. Native builds (and tests) never
//! install a subscriber, so tracing macros there are no-ops. The level sits
//! behind a reload layer so JavaScript can change it after start-up.

use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, reload};
use tracing_wasm::{WASMLayer, WASMLayerConfig};

static LEVEL: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Install the console subscriber. Later calls are ignored.
pub fn install(level: LevelFilter) {
    if LEVEL.get().is_some() {
        return;
    }
    let (filter, handle) = reload::Layer::new(level);
    let subscriber = Registry::default()
        .with(filter)
        .with(WASMLayer::new(WASMLayerConfig::default()));
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        // Only the first successful install reaches this point.
        let _ = LEVEL.set(handle);
    }
}

/// Change the maximum level. Returns false if no subscriber is installed.
pub fn set_level(level: LevelFilter) -> bool {
    LEVEL
        .get()
        .is_some_and(|handle| handle.reload(level).is_ok())
}

/// Parse a level name from JavaScript, falling back to `INFO`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level("WARN"), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("chatty"), LevelFilter::INFO);
    }

    #[test]
    fn test_set_level_without_subscriber() {
        assert!(!set_level(LevelFilter::DEBUG));
    }
}
