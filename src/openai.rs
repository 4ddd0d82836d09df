//! Client construction for OpenAI-compatible APIs (Groq, embedding servers).

use crate::error::{GenSearchError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the API at `api_base` with a default timeout.
pub fn create_client(api_base: &str, api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_base, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client for the API at `api_base` with a custom timeout.
pub fn create_client_with_timeout(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenSearchError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::config::Config;

    #[test]
    fn test_client_uses_given_base() {
        let client = create_client("https://api.groq.com/openai/v1/", "gsk-test").unwrap();
        assert_eq!(client.config().api_base(), "https://api.groq.com/openai/v1");
    }
}
