//! Core HTTP client for the homework statuses API

use std::future::Future;

use chrono::Local;
use compact_str::CompactString;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
};

/// Source of raw homework status responses.
///
/// Implementations make no retry attempts; the poller retries on its own schedule.
pub trait HomeworkSource: Send + Sync {
    /// Fetch homework statuses changed since `from_date` (Unix seconds)
    fn fetch(&self, from_date: i64) -> impl Future<Output = Result<Value>> + Send;
}

/// Pure HTTP client for the homework API
#[derive(Debug)]
pub struct PracticumApi {
    client: Client,
    config: ClientConfig,
}

impl PracticumApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request.timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { client, config })
    }

    /// Get current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create authenticated request builder
    fn authenticated_request(&self, from_date: i64) -> RequestBuilder {
        self.client
            .get(self.config.endpoint.as_str())
            .header("Authorization", format!("OAuth {}", self.config.practicum_token))
            .query(&[("from_date", from_date)])
    }

    /// Handle HTTP response and decode the JSON body
    async fn handle_response(&self, response: Response) -> Result<Value> {
        let endpoint = &self.config.endpoint;
        let status = response.status();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                endpoint = %endpoint,
                "Homework API returned an error status"
            );
            return Err(ClientError::upstream_status(status.as_u16(), endpoint.clone()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(endpoint.clone(), e))?;

        if self.config.debug.log_responses {
            self.log_response_to_file(&body);
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body_length = body.len(), "Failed to decode homework API response");
            ClientError::decode(endpoint.clone(), e)
        })
    }

    /// Log HTTP response to file for debugging
    fn log_response_to_file(&self, body: &str) {
        if let Some(log_dir) = &self.config.debug.log_directory {
            if !log_dir.exists()
                && let Err(e) = std::fs::create_dir_all(log_dir)
            {
                warn!("Failed to create log directory: {}", e);
                return;
            }

            let filename = format!(
                "{}_homework_statuses.json",
                Local::now().format("%Y-%m-%d_%H-%M-%S")
            );

            let log_path = log_dir.join(filename);

            if let Err(e) = std::fs::write(&log_path, body) {
                warn!("Failed to write response log to {:?}: {}", log_path, e);
            } else {
                debug!("Response logged to {:?}", log_path);
            }
        }
    }
}

impl HomeworkSource for PracticumApi {
    #[instrument(name = "get_api_answer", skip(self))]
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        let endpoint: &CompactString = &self.config.endpoint;
        debug!(endpoint = %endpoint, "Requesting homework statuses");

        let response = self
            .authenticated_request(from_date)
            .send()
            .await
            .map_err(|e| ClientError::transport(endpoint.clone(), e))?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    use super::*;
    use crate::client::config::RequestConfig;

    const HOMEWORK_PATH: &str = "/api/user_api/homework_statuses/";

    fn api_for(server: &MockServer) -> PracticumApi {
        let config =
            ClientConfig::new(format!("{}{}", server.uri(), HOMEWORK_PATH), "secret-token");
        PracticumApi::new(config).unwrap()
    }

    #[tokio::test]
    async fn fetch_sends_token_and_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HOMEWORK_PATH))
            .and(header("Authorization", "OAuth secret-token"))
            .and(query_param("from_date", "1700000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "homeworks": [{"status": "approved", "homework_name": "proj1"}],
                "current_date": 1700000600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = api_for(&server).fetch(1_700_000_000).await.unwrap();
        assert_eq!(response["homeworks"][0]["homework_name"], "proj1");
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch(0).await.unwrap_err();
        match &err {
            ClientError::UpstreamStatus { code, .. } => assert_eq!(*code, 500),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn unparsable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch(0).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn valid_json_of_any_shape_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "map"])))
            .mount(&server)
            .await;

        let response = api_for(&server).fetch(0).await.unwrap();
        assert!(response.is_array());
    }

    #[tokio::test]
    async fn slow_upstream_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"homeworks": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(format!("{}{}", server.uri(), HOMEWORK_PATH), "t")
            .with_request(RequestConfig { timeout: Duration::from_millis(50) });
        let err = PracticumApi::new(config).unwrap().fetch(0).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let config = ClientConfig::new(format!("http://127.0.0.1:1{HOMEWORK_PATH}"), "t");
        let api = PracticumApi::new(config).unwrap();
        let err = api.fetch(0).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[tokio::test]
    async fn transport_failures_keep_distinct_causes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"homeworks": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        let slow = ClientConfig::new(format!("{}{}", server.uri(), HOMEWORK_PATH), "t")
            .with_request(RequestConfig { timeout: Duration::from_millis(50) });
        let timed_out = PracticumApi::new(slow).unwrap().fetch(1).await.unwrap_err();

        let closed = ClientConfig::new(format!("http://127.0.0.1:1{HOMEWORK_PATH}"), "t");
        let refused = PracticumApi::new(closed).unwrap().fetch(1).await.unwrap_err();

        let (
            ClientError::Transport { detail: timeout_detail, .. },
            ClientError::Transport { detail: refused_detail, .. },
        ) = (&timed_out, &refused)
        else {
            panic!("expected transport errors: {timed_out:?} / {refused:?}");
        };

        assert!(timeout_detail.contains("timed out"), "{timeout_detail}");
        assert_ne!(timeout_detail, refused_detail);
        assert_ne!(refused_detail, "error sending request");
        assert!(!timed_out.to_string().contains("from_date"));
        assert!(!refused.to_string().contains("from_date"));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = PracticumApi::new(ClientConfig::new("not a url", "t")).unwrap_err();
        assert!(matches!(err, ClientError::ConfigValidation { .. }));
    }
}
