use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProxySection, UserAgentConfig};
use crate::crawler::normalize_proxy_endpoint;
use crate::url::parse_origin;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on `max-retries`
const MAX_RETRIES_LIMIT: u32 = 10;

/// Upper bound on `retry-delay-ms` (one minute)
const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_proxy_config(&config.proxy)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    parse_origin(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e)))?;

    if config.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= {}, got {}",
            MAX_RETRIES_LIMIT, config.max_retries
        )));
    }

    if config.retry_delay_ms == 0 {
        return Err(ConfigError::Validation(
            "retry-delay-ms must be >= 1ms".to_string(),
        ));
    }

    if config.retry_delay_ms > MAX_RETRY_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "retry-delay-ms must be <= {}, got {}",
            MAX_RETRY_DELAY_MS, config.retry_delay_ms
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    // Header values must be visible ASCII
    if !config.value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Err(ConfigError::Validation(format!(
            "user-agent value contains characters not allowed in a header: '{}'",
            config.value
        )));
    }

    Ok(())
}

/// Validates every proxy endpoint
fn validate_proxy_config(config: &ProxySection) -> ConfigResult<()> {
    for endpoint in &config.endpoints {
        validate_proxy_endpoint(endpoint)?;
    }
    Ok(())
}

/// Validates one proxy endpoint after scheme normalization
fn validate_proxy_endpoint(endpoint: &str) -> ConfigResult<()> {
    if endpoint.trim().is_empty() {
        return Err(ConfigError::InvalidProxy(
            "Proxy endpoint cannot be empty".to_string(),
        ));
    }

    let normalized = normalize_proxy_endpoint(endpoint);
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidProxy(format!("'{}': {}", endpoint, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidProxy(format!(
            "'{}': only http and https proxies are supported",
            endpoint
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidProxy(format!(
            "'{}': missing host",
            endpoint
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
