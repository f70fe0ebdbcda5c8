//! # Runtime Configuration
//!
//! Environment-driven settings for the coroutine runtime.
//!
//! ## `TODO_STACK_SIZE`
//!
//! Stack size for handler coroutines. Accepts decimal (`32768`) or
//! hexadecimal (`0x8000`). Default: `0x8000` (32 KB).
//!
//! ```rust
//! use todolist_api::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

/// Default coroutine stack size in bytes.
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to the
    /// default for unset or unparsable values.
    pub fn from_env() -> Self {
        let stack_size = env::var("TODO_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` configuration.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Parse a size given in decimal or `0x`-prefixed hex. Zero is rejected.
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    };
    parsed.filter(|&n| n > 0)
}
