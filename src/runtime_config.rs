//! Environment based runtime configuration.
//!
//! `WAYMARK_STACK_SIZE` sets the coroutine stack size in bytes, in
//! decimal (`16384`) or hex (`0x4000`). Handlers run on coroutines, so
//! the stack must cover the deepest handler call chain; the 16 KB
//! default suits plain JSON endpoints.

use std::env;

/// Default coroutine stack size in bytes.
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes.
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { stack_size: DEFAULT_STACK_SIZE }
    }
}

impl RuntimeConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for unset or unparseable values.
    pub fn from_env() -> Self {
        let stack_size = env::var("WAYMARK_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }
}

fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}
