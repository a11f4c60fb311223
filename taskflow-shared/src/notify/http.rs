/// HTTP email transport
///
/// Posts `{from, to, subject, html}` as JSON to `EMAIL_API_URL` with
/// `Authorization: Bearer <EMAIL_API_KEY>`. Any 2xx response counts as
/// delivered.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{EmailMessage, MailError, Mailer};

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    /// Builds a mailer for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `MailError::Config` if the endpoint is empty or the HTTP client
    /// cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
    ) -> Result<Self, MailError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(MailError::Config("email endpoint is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let body = SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(to = %message.to, status = status.as_u16(), "Email transport rejected message");
            return Err(MailError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(to = %message.to, subject = %message.subject, "Email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_endpoint() {
        assert!(matches!(
            HttpMailer::new("  ", None, "noreply@example.com"),
            Err(MailError::Config(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendRequest {
            from: "noreply@example.com",
            to: "a@x.com",
            subject: "Hi",
            html: "<p>Hi</p>",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["from"], "noreply@example.com");
        assert_eq!(json["to"], "a@x.com");
        assert_eq!(json["html"], "<p>Hi</p>");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let mailer = HttpMailer::new("http://127.0.0.1:9/send", None, "noreply@example.com").unwrap();
        let result = mailer
            .send(EmailMessage {
                to: "a@x.com".to_string(),
                subject: "Hi".to_string(),
                html: String::new(),
            })
            .await;
        assert!(matches!(result, Err(MailError::Transport(_))));
    }
}
