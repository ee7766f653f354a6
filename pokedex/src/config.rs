use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::fetch::RetryPolicy;
use crate::rate::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    pub rate_window: Duration,
    pub rate_max_requests: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
            rate_window: DEFAULT_WINDOW,
            rate_max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}
