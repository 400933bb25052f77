//! Proxy selection
//!
//! A proxy is chosen once, when the configuration is built, and never changes
//! for the lifetime of a crawl session. Concurrent fetches only read it.

use rand::seq::SliceRandom;
use serde::Deserialize;

/// How proxy endpoints are used across requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyPolicy {
    /// Every request goes through the one selected endpoint
    #[default]
    Fixed,

    /// A failed fetch is retried through the next endpoint, until one succeeds
    Rotate,
}

/// Proxy pool with its session-wide selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Endpoints as configured
    pool: Vec<String>,

    /// Index into `pool` of the selected endpoint; None when the pool is empty
    selected: Option<usize>,

    policy: ProxyPolicy,
}

impl ProxyConfig {
    /// Creates a proxy configuration, selecting one endpoint at random
    ///
    /// # Arguments
    ///
    /// * `pool` - Proxy endpoints (`host:port` or full URLs); empty means direct
    /// * `policy` - How the endpoints are used
    pub fn new(pool: Vec<String>, policy: ProxyPolicy) -> Self {
        let indices: Vec<usize> = (0..pool.len()).collect();
        let selected = indices.choose(&mut rand::thread_rng()).copied();

        if let Some(index) = selected {
            tracing::info!(
                "Selected proxy for all requests: {}",
                normalize_proxy_endpoint(&pool[index])
            );
        }

        Self {
            pool,
            selected,
            policy,
        }
    }

    /// Creates a configuration that sends every request direct
    pub fn direct() -> Self {
        Self::default()
    }

    /// Returns the endpoints as configured
    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Returns the proxy policy
    pub fn policy(&self) -> ProxyPolicy {
        self.policy
    }

    /// Returns the selected endpoint, normalized with a scheme prefix
    pub fn selected(&self) -> Option<String> {
        self.selected
            .map(|index| normalize_proxy_endpoint(&self.pool[index]))
    }

    /// Returns true if requests go direct
    pub fn is_direct(&self) -> bool {
        self.selected.is_none()
    }

    /// Returns the routes a fetch may take, in the order they are tried
    ///
    /// `None` is the direct route. Under [`ProxyPolicy::Fixed`] there is exactly
    /// one route. Under [`ProxyPolicy::Rotate`] every endpoint is listed once,
    /// starting at the selected one and wrapping around the pool.
    pub fn routes(&self) -> Vec<Option<String>> {
        let Some(start) = self.selected else {
            return vec![None];
        };

        match self.policy {
            ProxyPolicy::Fixed => vec![self.selected()],
            ProxyPolicy::Rotate => (0..self.pool.len())
                .map(|offset| {
                    let endpoint = &self.pool[(start + offset) % self.pool.len()];
                    Some(normalize_proxy_endpoint(endpoint))
                })
                .collect(),
        }
    }
}

/// Prefixes an endpoint with `http://` unless it already names a scheme
pub fn normalize_proxy_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    }
}
