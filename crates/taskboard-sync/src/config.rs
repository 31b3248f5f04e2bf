use std::time::Duration;

use taskboard_core::DEFAULT_PAGE_SIZE;
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "http://localhost:4000";
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(120);

/// Client-side settings for talking to the task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST resource service (e.g., "http://localhost:4000").
    pub api_base: String,
    /// Fixed number of tasks per listing page.
    pub page_size: u32,
    /// Age after which a cached listing is refetched on next observation.
    pub stale_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            stale_time: DEFAULT_STALE_TIME,
        }
    }
}

impl ClientConfig {
    /// Build from environment variables.
    /// `TASKBOARD_API_BASE`, `TASKBOARD_PAGE_SIZE` and `TASKBOARD_STALE_SECS`
    /// override the defaults; unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup("TASKBOARD_API_BASE").filter(|v| !v.trim().is_empty()) {
            config.api_base = base.trim().to_string();
        }
        if let Some(size) = parse_var(&lookup, "TASKBOARD_PAGE_SIZE").filter(|n: &u32| *n > 0) {
            config.page_size = size;
        }
        if let Some(secs) = parse_var(&lookup, "TASKBOARD_STALE_SECS") {
            config.stale_time = Duration::from_secs(secs);
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {name}={raw:?}: not a valid number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_board_constants() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.page_size, 8);
        assert_eq!(config.stale_time, Duration::from_secs(120));
        assert_eq!(config.api_base, "http://localhost:4000");
    }

    #[test]
    fn env_overrides_apply() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TASKBOARD_API_BASE", "http://tasks.internal:8080/"),
            ("TASKBOARD_PAGE_SIZE", "20"),
            ("TASKBOARD_STALE_SECS", "5"),
        ]));
        assert_eq!(config.api_base, "http://tasks.internal:8080/");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.stale_time, Duration::from_secs(5));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TASKBOARD_PAGE_SIZE", "0"),
            ("TASKBOARD_STALE_SECS", "soon"),
        ]));
        assert_eq!(config.page_size, 8);
        assert_eq!(config.stale_time, DEFAULT_STALE_TIME);
    }
}
