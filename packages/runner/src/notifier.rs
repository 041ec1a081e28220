use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::event::LifecycleResponse;

const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("callback rejected with HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Delivers the final status of a lifecycle request to its callback URL.
#[async_trait]
pub trait ResponseNotifier: Send + Sync {
    async fn notify(&self, url: &str, response: &LifecycleResponse) -> Result<(), NotifyError>;
}

/// `PUT`s the response document to a pre-signed HTTPS URL.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    max_retries: usize,
}

impl HttpNotifier {
    pub fn new(timeout: Duration, max_retries: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            max_retries,
        }
    }
}

#[async_trait]
impl ResponseNotifier for HttpNotifier {
    async fn notify(&self, url: &str, response: &LifecycleResponse) -> Result<(), NotifyError> {
        // Pre-signed callback URLs are signed without a content type.
        let body = serde_json::to_vec(response)?;
        let mut retry = 0;

        loop {
            let result = self
                .client
                .put(url)
                .header(reqwest::header::CONTENT_TYPE, "")
                .body(body.clone())
                .send()
                .await;

            let err = match result {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(status = %resp.status(), request_id = %response.request_id, "callback delivered");
                    return Ok(());
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    let retryable = is_retryable(status);
                    let err = NotifyError::HttpStatus { status, body };
                    if !retryable {
                        return Err(err);
                    }
                    err
                }
                Err(e) => NotifyError::Request(e),
            };

            if retry >= self.max_retries {
                return Err(err);
            }
            let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
            warn!(retry, error = %err, "callback failed, retrying");
            sleep(backoff).await;
            retry += 1;
        }
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
