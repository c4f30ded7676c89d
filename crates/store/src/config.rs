//! Per-screen store configuration with env-var overrides.

use std::time::Duration;

use workboard_core::{DEFAULT_DEBOUNCE_MS, MAX_PAGE_LIMIT, QueryState};

/// Configuration for one screen's [`ListStore`](crate::ListStore).
///
/// `screen_key` scopes persisted preferences; `defaults` is both the initial
/// query and the baseline against which URL parameters are omitted.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub screen_key: String,
    pub debounce: Duration,
    pub defaults: QueryState,
}

impl StoreConfig {
    /// Config with stock defaults, honoring `WORKBOARD_DEBOUNCE_MS` and
    /// `WORKBOARD_PAGE_LIMIT` overrides.
    #[must_use]
    pub fn new(screen_key: impl Into<String>) -> Self {
        let debounce_ms = env_override("WORKBOARD_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS);
        let mut defaults = QueryState::default();
        defaults.limit = env_override("WORKBOARD_PAGE_LIMIT", defaults.limit).clamp(1, MAX_PAGE_LIMIT);
        Self {
            screen_key: screen_key.into(),
            debounce: Duration::from_millis(debounce_ms),
            defaults,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: QueryState) -> Self {
        self.defaults = defaults;
        self
    }

    /// Preference-store key for this screen's persisted view mode.
    #[must_use]
    pub fn view_mode_key(&self) -> String {
        format!("{}.view_mode", self.screen_key)
    }
}

fn env_override<T: std::str::FromStr + std::fmt::Display>(var: &str, default: T) -> T {
    parse_override(var, std::env::var(var).ok(), default)
}

/// Parse an optional raw override value. Unset is the expected case and
/// silent; set-but-unparseable logs a warning and keeps the default.
fn parse_override<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(var, value = %v, default = %default, "invalid env override, using default");
                default
            },
        },
        None => default,
    }
}
