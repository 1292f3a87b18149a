// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, warn};

use super::{MailError, Mailer, OutgoingEmail};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 120,
        }
    }
}

/// Delivers mail by POSTing JSON to an HTTP mail API.
///
/// Server errors and connection failures are retried with linear backoff;
/// client errors are returned immediately.
pub struct HttpMailer {
    endpoint: String,
    bearer: Option<String>,
    sender: String,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(
        endpoint: String,
        bearer: Option<String>,
        sender: String,
        retry: RetryPolicy,
    ) -> Result<Self, MailError> {
        reqwest::Url::parse(&endpoint)
            .map_err(|e| MailError::Config(format!("invalid mail endpoint: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| MailError::Config(format!("mail client build failed: {e}")))?;
        Ok(Self {
            endpoint,
            bearer,
            sender,
            retry,
            client,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap, MailError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| MailError::Config(format!("invalid auth header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    fn transport_tag(&self) -> &'static str {
        "http"
    }

    #[instrument(name = "mail_http_send", skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let headers = self.auth_headers()?;
        let payload = json!({
            "from": self.sender,
            "to": email.to,
            "subject": email.subject,
            "html": email.html,
        });
        let mut attempt = 0;
        loop {
            attempt += 1;
            let req = self
                .client
                .post(&self.endpoint)
                .headers(headers.clone())
                .json(&payload);
            match req.send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) if resp.status().is_client_error() => {
                    return Err(MailError::Rejected {
                        status: resp.status().as_u16(),
                    });
                }
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(MailError::Rejected {
                            status: resp.status().as_u16(),
                        });
                    }
                    warn!(attempt, status = resp.status().as_u16(), "mail send failed, retrying");
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(MailError::Transport(e.to_string()));
                    }
                    warn!(attempt, error = %e, "mail send failed, retrying");
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt as u64),
            ))
            .await;
        }
    }
}
