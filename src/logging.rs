//! Logging setup.
//!
//! The library never installs a subscriber on its own when embedded in a
//! Rust program. The C surface and the demo binary call [`init`] once.

use tracing_subscriber::EnvFilter;

/// Default filter directive.
pub fn default_filter() -> &'static str {
    if cfg!(feature = "debug-tracing") {
        "debug"
    } else {
        "info"
    }
}

/// Install a global fmt subscriber with the given filter.
///
/// Returns false if a subscriber was already installed (by the host or an
/// earlier call); the existing one is kept.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first() {
        let _ = init("info");
        assert!(!init("debug"));
    }

    #[test]
    fn test_bad_filter_falls_back() {
        // Must not panic on a malformed directive
        let _ = init("=[not a filter");
    }
}
