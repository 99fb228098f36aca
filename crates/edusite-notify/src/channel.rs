//! Outbound mail channel
//!
//! The channel is the pooled connection set used for message delivery. It
//! sits behind the [`MailChannel`] trait so the dispatcher never couples to
//! a transport library's error shape: every failure is classified into a
//! [`DeliveryError`] before it crosses the trait boundary.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MessageAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rand::Rng;

use edusite_core::Config;

/// A caller-supplied attachment, passed through unchanged.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One outbound message, fully assembled by the dispatcher.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

/// Classified delivery failure. Terminal states of the dispatch attempt;
/// no variant is retried by this crate.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Credential or authorization rejection (SMTP 530/534/535/538). The
    /// hint distinguishes the wrong-credential case from providers that
    /// require an app-specific password, since this is the dominant
    /// real-world misconfiguration.
    #[error("SMTP authentication rejected: {detail}")]
    Auth { detail: String, hint: &'static str },

    /// Transport-level failure reaching the relay (connect, TLS, timeout).
    #[error("Connection to mail relay failed: {detail}")]
    Connection { detail: String },

    /// Any other rejection: bad recipient, quota, content rejection.
    #[error("Message rejected: {detail}")]
    Other { detail: String },
}

pub const AUTH_HINT: &str = "Check SMTP_USER and SMTP_PASSWORD; consumer providers \
(e.g. Gmail) reject account passwords and require an app-specific password";

/// Outbound channel seam. Implemented by the pooled SMTP transport in
/// production and by scripted stubs in tests.
#[async_trait]
pub trait MailChannel: Send + Sync {
    /// Submit one message, returning its message identifier on acceptance.
    async fn submit(&self, envelope: Envelope) -> Result<String, DeliveryError>;

    /// Startup connectivity check. Failure is reported, never fatal; sends
    /// are still attempted and fail individually if the channel is unusable.
    async fn verify(&self) -> bool {
        true
    }
}

/// Pooled SMTP transport. Bound once at process start from configuration
/// and shared by all callers; pooled connection acquisition and release is
/// the transport's responsibility.
#[derive(Clone)]
pub struct SmtpChannel {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpChannel {
    /// Build the pooled transport from config. Returns `None` when SMTP is
    /// not configured (no host or no from-address).
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.smtp_configured() {
            tracing::debug!("SMTP not configured; notification channel disabled");
            return None;
        }
        let host = config.smtp_host.as_deref()?;
        let port = config.smtp_port;
        let pool = PoolConfig::new().max_size(config.smtp_pool_size);
        let timeout = Some(Duration::from_secs(config.smtp_timeout_secs));

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let builder = builder.port(port).pool_config(pool).timeout(timeout);
        let builder = if let (Some(user), Some(password)) =
            (config.smtp_user.as_ref(), config.smtp_password.as_ref())
        {
            builder.credentials(Credentials::new(user.clone(), password.clone()))
        } else {
            builder
        };

        tracing::info!(
            host = %host,
            port = port,
            pool_size = config.smtp_pool_size,
            tls = config.smtp_tls,
            "SMTP channel initialized"
        );

        Some(SmtpChannel {
            mailer: builder.build(),
            host: host.to_string(),
        })
    }

    fn build_message(&self, envelope: &Envelope, message_id: &str) -> Result<Message, DeliveryError> {
        let from: Mailbox = format!("{} <{}>", envelope.from_name, envelope.from_address)
            .parse()
            .map_err(|e| DeliveryError::Other {
                detail: format!("Invalid from address '{}': {}", envelope.from_address, e),
            })?;
        let to: Mailbox = envelope
            .to
            .parse()
            .map_err(|e| DeliveryError::Other {
                detail: format!("Invalid recipient '{}': {}", envelope.to, e),
            })?;

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(envelope.subject.clone())
            .message_id(Some(message_id.to_string()));

        let message = if envelope.attachments.is_empty() {
            builder
                .header(ContentType::TEXT_HTML)
                .body(envelope.html.clone())
        } else {
            let mut parts = MultiPart::mixed().singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(envelope.html.clone()),
            );
            for attachment in &envelope.attachments {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    DeliveryError::Other {
                        detail: format!(
                            "Invalid attachment content type '{}': {}",
                            attachment.content_type, e
                        ),
                    }
                })?;
                parts = parts.singlepart(
                    MessageAttachment::new(attachment.filename.clone())
                        .body(attachment.data.clone(), content_type),
                );
            }
            builder.multipart(parts)
        };

        message.map_err(|e| DeliveryError::Other {
            detail: format!("Failed to assemble message: {}", e),
        })
    }
}

#[async_trait]
impl MailChannel for SmtpChannel {
    async fn submit(&self, envelope: Envelope) -> Result<String, DeliveryError> {
        let message_id = generate_message_id(&self.host);
        let message = self.build_message(&envelope, &message_id)?;

        match self.mailer.send(message).await {
            Ok(_) => Ok(message_id),
            Err(e) => Err(classify_smtp_error(e)),
        }
    }

    async fn verify(&self) -> bool {
        match self.mailer.test_connection().await {
            Ok(true) => {
                tracing::info!(host = %self.host, "SMTP channel verified");
                true
            }
            Ok(false) => {
                tracing::warn!(host = %self.host, "SMTP channel verification returned NO");
                false
            }
            Err(e) => {
                tracing::warn!(
                    host = %self.host,
                    error = %e,
                    "SMTP channel verification failed; sends will be attempted anyway"
                );
                false
            }
        }
    }
}

/// RFC 5322 message identifier: `<{millis}.{random}@{host}>`.
fn generate_message_id(host: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("<{}.{}@{}>", millis, suffix, host)
}

/// Map a transport error onto the delivery outcome taxonomy. Auth-category
/// rejections are singled out because they are the most common
/// misconfiguration and need an actionable diagnostic.
fn classify_smtp_error(err: lettre::transport::smtp::Error) -> DeliveryError {
    if let Some(code) = err.status() {
        let code = code.to_string();
        if matches!(code.as_str(), "530" | "534" | "535" | "538") {
            return DeliveryError::Auth {
                detail: format!("{} ({})", err, code),
                hint: AUTH_HINT,
            };
        }
        return DeliveryError::Other {
            detail: err.to_string(),
        };
    }

    if err.is_timeout() || has_io_source(&err) {
        return DeliveryError::Connection {
            detail: err.to_string(),
        };
    }

    DeliveryError::Other {
        detail: err.to_string(),
    }
}

fn has_io_source(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<std::io::Error>() {
            return true;
        }
        source = inner.source();
    }
    false
}
