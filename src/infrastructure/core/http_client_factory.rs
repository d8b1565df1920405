use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware
    pub fn create_client() -> ClientWithMiddleware {
        // Exponential backoff, max 3 retries on transient failures
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Appends URL-encoded query parameters to `base_url`.
///
/// The middleware request builder has no `.query()`, so query strings are
/// assembled up front.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base_url).with_context(|| format!("Invalid URL: {}", base_url))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key.as_ref(), value.as_ref());
        }
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_encoded_params() {
        let url = build_url_with_query(
            "https://api.bybit.com/v5/market/kline",
            &[("category", "linear"), ("symbol", "BTC USDT")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://api.bybit.com/v5/market/kline?category=linear&symbol=BTC+USDT"
        );
    }

    #[test]
    fn test_keeps_existing_query() {
        let url = build_url_with_query("https://example.com/a?x=1", &[("y", "2")]).unwrap();
        assert_eq!(url, "https://example.com/a?x=1&y=2");
    }

    #[test]
    fn test_no_params() {
        let params: [(&str, &str); 0] = [];
        let url = build_url_with_query("https://example.com/a", &params).unwrap();
        assert_eq!(url, "https://example.com/a");
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(build_url_with_query("/v5/market/kline", &[("a", "b")]).is_err());
    }
}
