//! Token exchange client.

use std::time::Duration;

use async_trait::async_trait;
use log::*;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::error::{exchange_error, Error, ExchangeErrorKind};

/// Longest response body kept in an error for diagnostics.
const MAX_ERROR_BODY_LEN: usize = 512;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout. The token endpoint is third-party, so every exchange
    /// is bounded by it.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: format!("provider-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Performs the server-to-server POST of the exchange leg.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// POST `encoded_body` as a form to `endpoint`.
    ///
    /// Returns the raw response body on any 2xx status. Transport failures,
    /// timeouts and non-2xx statuses are errors; the status code and a prefix
    /// of the body are kept in the error. The request is never retried since
    /// authorization codes are single-use.
    async fn post_for_json(&self, endpoint: &Url, encoded_body: String) -> Result<String, Error>;
}

/// [`TokenExchanger`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    client: reqwest::Client,
}

#[async_trait]
impl TokenExchanger for ExchangeClient {
    async fn post_for_json(&self, endpoint: &Url, encoded_body: String) -> Result<String, Error> {
        debug!("Posting token exchange to {}", endpoint);

        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(encoded_body)
            .send()
            .await
            .map_err(|e| {
                warn!("Token exchange request to {} failed: {:?}", endpoint, e);
                Error::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            info!("Token exchange with {} succeeded ({})", endpoint, status);
            Ok(body)
        } else {
            warn!("Token exchange with {} returned {}", endpoint, status);
            Err(exchange_error(
                ExchangeErrorKind::Status(status.as_u16()),
                &truncate(&body, MAX_ERROR_BODY_LEN),
            ))
        }
    }
}

fn truncate(body: &str, max_len: usize) -> String {
    match body.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Builder for the shared [`ExchangeClient`].
pub struct ExchangeClientBuilder {
    config: HttpClientConfig,
}

impl ExchangeClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured client.
    pub fn build(self) -> Result<ExchangeClient, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        Ok(ExchangeClient { client })
    }
}

impl Default for ExchangeClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use mockito::{Matcher, Server};
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[test]
    fn test_builder_default() {
        let builder = ExchangeClientBuilder::new();
        assert_eq!(builder.config.timeout, Duration::from_secs(20));
        assert!(builder.config.user_agent.starts_with("provider-auth/"));
    }

    #[test]
    fn test_builder_with_timeout() {
        let builder = ExchangeClientBuilder::new().with_timeout(Duration::from_secs(10));
        assert_eq!(builder.config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[tokio::test]
    async fn test_post_for_json_returns_raw_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_header("accept", "application/json")
            .match_body(Matcher::Exact("code=abc&client_id=CK".to_string()))
            .with_status(200)
            .with_body("access_token=t0k&token_type=bearer")
            .create_async()
            .await;

        let client = ExchangeClientBuilder::new().build().unwrap();
        let endpoint = Url::parse(&format!("{}/token", server.url())).unwrap();
        let body = client
            .post_for_json(&endpoint, "code=abc&client_id=CK".to_string())
            .await
            .unwrap();

        assert_eq!(body, "access_token=t0k&token_type=bearer");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_for_json_non_2xx_is_error_with_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"bad_verification_code"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ExchangeClientBuilder::new().build().unwrap();
        let endpoint = Url::parse(&format!("{}/token", server.url())).unwrap();
        let err = client
            .post_for_json(&endpoint, "code=used".to_string())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Exchange(ExchangeErrorKind::Status(400))
        );
        assert!(err.to_string().contains("bad_verification_code"));
        // Single attempt only.
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_for_json_connection_refused_is_network_error() {
        let client = ExchangeClientBuilder::new().build().unwrap();
        // Port 9 (discard) on localhost is not expected to accept connections.
        let endpoint = Url::parse("http://127.0.0.1:9/token").unwrap();
        let err = client
            .post_for_json(&endpoint, String::new())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Exchange(ExchangeErrorKind::Network)
        );
    }

    #[tokio::test]
    async fn test_post_for_json_times_out_when_server_never_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = ExchangeClientBuilder::new()
            .with_timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let endpoint = Url::parse(&format!("http://{addr}/token")).unwrap();

        let started = Instant::now();
        let err = client
            .post_for_json(&endpoint, "code=abc".to_string())
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(
            err.error_kind,
            ErrorKind::Exchange(ExchangeErrorKind::Timeout)
        );
        assert!(elapsed >= Duration::from_millis(900), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(10), "{elapsed:?}");
        server.abort();
    }
}
