//! Configuration module
//!
//! Environment-driven settings for the client: API endpoint, cache
//! location, request timeout, and confirmation-poll timing. Invalid values
//! fall back to the defaults with a warning rather than failing startup.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const REQUEST_TIMEOUT_SECS: u64 = 30;

// Poll timing: the initial delay gives the mobile-money prompt time to
// reach the handset; interval x attempts caps the total wait at roughly
// one and a half minutes.
const POLL_INITIAL_DELAY_SECS: u64 = 10;
const POLL_INTERVAL_SECS: u64 = 6;
const POLL_MAX_ATTEMPTS: u32 = 15;

/// Client configuration shared by the store, workflow, and poller.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Where the tenant-config fallback cache is written. `None` disables
    /// persistence.
    pub cache_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub poll_initial_delay_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    /// When the confirmation poll exhausts its attempts without a definitive
    /// answer, treat the payment as successful. On by default to match the
    /// product behavior; see DESIGN.md before changing either default.
    pub assume_success_on_timeout: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_path: default_cache_path(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            poll_initial_delay_secs: POLL_INITIAL_DELAY_SECS,
            poll_interval_secs: POLL_INTERVAL_SECS,
            poll_max_attempts: POLL_MAX_ATTEMPTS,
            assume_success_on_timeout: true,
        }
    }
}

impl ClientConfig {
    /// Build from environment variables, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("EDUMANAGE_API_URL")
                .or_else(|_| env::var("API_URL"))
                .unwrap_or(defaults.api_url),
            cache_path: env::var("EDUMANAGE_CACHE_PATH")
                .map(PathBuf::from)
                .ok()
                .or(defaults.cache_path),
            request_timeout_secs: parse_env(
                "EDUMANAGE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            poll_initial_delay_secs: parse_env(
                "EDUMANAGE_POLL_INITIAL_DELAY_SECS",
                defaults.poll_initial_delay_secs,
            ),
            poll_interval_secs: parse_env(
                "EDUMANAGE_POLL_INTERVAL_SECS",
                defaults.poll_interval_secs,
            ),
            poll_max_attempts: parse_env(
                "EDUMANAGE_POLL_MAX_ATTEMPTS",
                defaults.poll_max_attempts,
            ),
            assume_success_on_timeout: parse_env(
                "EDUMANAGE_ASSUME_SUCCESS_ON_TIMEOUT",
                defaults.assume_success_on_timeout,
            ),
        }
    }
}

fn default_cache_path() -> Option<PathBuf> {
    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".edumanage").join("tenant_config.json"))
}

fn parse_env<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, raw = %raw, %default, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
