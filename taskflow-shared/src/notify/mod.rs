/// Notification gateway
///
/// Outbound email goes through the [`Mailer`] trait so the identity engine can
/// run against a real transport in production and a recording fake in tests.
///
/// # Implementations
///
/// - [`http::HttpMailer`]: JSON POST to an email API
/// - [`LogMailer`]: logs recipient and subject only; used when no transport is configured
/// - [`memory::MemoryMailer`]: records messages, can be told to fail
///
/// Delivery is a single attempt. A failed send is reported to the caller,
/// which is responsible for rolling back any token it just issued.

pub mod http;
pub mod memory;
pub mod templates;

use async_trait::async_trait;
use tracing::info;

pub use http::HttpMailer;
pub use memory::MemoryMailer;

/// One outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivery failures
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Could not reach the transport
    #[error("Email transport unreachable: {0}")]
    Transport(String),

    /// Transport answered with a non-success status
    #[error("Email transport rejected message with status {status}")]
    Rejected { status: u16 },

    /// Mailer misconfigured
    #[error("Email configuration error: {0}")]
    Config(String),
}

/// Email delivery capability
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Mailer that only logs
///
/// Bodies are not logged because they carry OTPs and reset links.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Email transport not configured; message not delivered"
        );
        Ok(())
    }
}
