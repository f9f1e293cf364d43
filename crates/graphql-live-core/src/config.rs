//! Runtime configuration, read from `GRAPHQL_LIVE_*` environment variables.

use crate::schema::guards::{clamp_int, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Type name stamped into every connection cursor.
pub const DEFAULT_CURSOR_TYPE: &str = "arrayconnection";

pub const DEFAULT_BROADCAST_WORKERS: usize = 4;
const MAX_BROADCAST_WORKERS: i64 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConfig {
    /// Type name encoded into edge cursors.
    pub cursor_type: String,
    /// Page size used when a connection is queried without `first`.
    pub default_page_size: i64,
    /// Upper bound for `first`.
    pub max_page_size: i64,
    /// Rayon threads used to fan out deliveries.
    pub broadcast_workers: usize,
    /// When false, deliveries run sequentially on the calling thread.
    pub broadcast_parallel: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            cursor_type: DEFAULT_CURSOR_TYPE.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            broadcast_workers: DEFAULT_BROADCAST_WORKERS,
            broadcast_parallel: true,
        }
    }
}

impl LiveConfig {
    /// Build a config from the process environment, falling back to defaults
    /// for unset or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cursor_type = lookup("GRAPHQL_LIVE_CURSOR_TYPE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !v.contains(':'))
            .unwrap_or(defaults.cursor_type);

        let max_page_size = parse_int(lookup("GRAPHQL_LIVE_MAX_PAGE_SIZE"))
            .map(|v| clamp_int(v, 1, MAX_PAGE_SIZE))
            .unwrap_or(defaults.max_page_size);

        let default_page_size = parse_int(lookup("GRAPHQL_LIVE_DEFAULT_PAGE_SIZE"))
            .unwrap_or(defaults.default_page_size);
        let default_page_size = clamp_int(default_page_size, 1, max_page_size);

        let broadcast_workers = parse_int(lookup("GRAPHQL_LIVE_BROADCAST_WORKERS"))
            .map(|v| clamp_int(v, 1, MAX_BROADCAST_WORKERS) as usize)
            .unwrap_or(defaults.broadcast_workers);

        let broadcast_parallel = match lookup("GRAPHQL_LIVE_BROADCAST_PARALLEL") {
            Some(val) => {
                let v = val.trim().to_lowercase();
                !matches!(v.as_str(), "0" | "false" | "no" | "off")
            }
            None => defaults.broadcast_parallel,
        };

        Self {
            cursor_type,
            default_page_size,
            max_page_size,
            broadcast_workers,
            broadcast_parallel,
        }
    }
}

fn parse_int(value: Option<String>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}
