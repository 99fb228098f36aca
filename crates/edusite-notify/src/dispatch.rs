//! Notification dispatcher
//!
//! `send` resolves a template, renders it, and hands the message to the
//! channel; `send_raw` skips template resolution for callers that already
//! hold HTML. Both always return a [`SendResult`]: callers receive a
//! structured outcome even on total failure, and classification logging
//! happens here, at the point of failure, separate from the returned value.

use std::sync::Arc;

use serde::Serialize;

use edusite_core::{AppError, Config};

use crate::channel::{Attachment, DeliveryError, Envelope, MailChannel, SmtpChannel};
use crate::template::TemplateStore;

/// Failure classification carried by [`SendResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TemplateNotFound,
    RenderFailure,
    AuthError,
    ConnectionError,
    OtherError,
}

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SendResult {
    #[serde(rename = "success")]
    Sent { message_id: String },
    #[serde(rename = "failure")]
    Failed {
        kind: FailureKind,
        detail: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<&'static str>,
    },
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Sent { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            SendResult::Sent { message_id } => Some(message_id),
            SendResult::Failed { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SendResult::Sent { .. } => None,
            SendResult::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Notification dispatch service. Explicitly constructed with its channel
/// and template store; no process-wide singletons.
pub struct Notifier {
    channel: Arc<dyn MailChannel>,
    templates: Arc<TemplateStore>,
    from_name: String,
    from_address: String,
}

impl Notifier {
    pub fn new(
        channel: Arc<dyn MailChannel>,
        templates: Arc<TemplateStore>,
        from_name: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Self {
        Notifier {
            channel,
            templates,
            from_name: from_name.into(),
            from_address: from_address.into(),
        }
    }

    /// Build the dispatcher from config over a pooled SMTP channel.
    /// Returns `None` when SMTP is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let channel = SmtpChannel::from_config(config)?;
        let from_address = config.smtp_from_address.clone()?;
        Some(Notifier::new(
            Arc::new(channel),
            Arc::new(TemplateStore::new(config.template_dir.clone())),
            config.smtp_from_name.clone(),
            from_address,
        ))
    }

    /// Asynchronous startup verification. Logs and reports; never fatal.
    pub async fn verify_channel(&self) -> bool {
        self.channel.verify().await
    }

    /// Render `template_name` with `ctx` and dispatch the result.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        ctx: &serde_json::Value,
        attachments: Vec<Attachment>,
    ) -> SendResult {
        let html = match self.templates.render(template_name, ctx) {
            Ok(html) => html,
            Err(AppError::TemplateNotFound(name)) => {
                tracing::error!(template = %name, "Dispatch aborted: template not found");
                return SendResult::Failed {
                    kind: FailureKind::TemplateNotFound,
                    detail: format!("Template '{}' not found", name),
                    hint: None,
                };
            }
            Err(e) => {
                tracing::error!(template = %template_name, error = %e, "Dispatch aborted: render failed");
                return SendResult::Failed {
                    kind: FailureKind::RenderFailure,
                    detail: e.to_string(),
                    hint: None,
                };
            }
        };
        self.deliver(to, subject, html, attachments).await
    }

    /// Dispatch caller-supplied HTML, bypassing template resolution.
    pub async fn send_raw(
        &self,
        to: &str,
        subject: &str,
        html: String,
        attachments: Vec<Attachment>,
    ) -> SendResult {
        self.deliver(to, subject, html, attachments).await
    }

    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        html: String,
        attachments: Vec<Attachment>,
    ) -> SendResult {
        let envelope = Envelope {
            from_name: self.from_name.clone(),
            from_address: self.from_address.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html,
            attachments,
        };

        match self.channel.submit(envelope).await {
            Ok(message_id) => {
                tracing::info!(to = %to, message_id = %message_id, "Notification sent");
                SendResult::Sent { message_id }
            }
            Err(DeliveryError::Auth { detail, hint }) => {
                tracing::error!(to = %to, detail = %detail, hint = hint, "SMTP authentication failed");
                SendResult::Failed {
                    kind: FailureKind::AuthError,
                    detail,
                    hint: Some(hint),
                }
            }
            Err(DeliveryError::Connection { detail }) => {
                tracing::warn!(to = %to, detail = %detail, "Mail relay unreachable");
                SendResult::Failed {
                    kind: FailureKind::ConnectionError,
                    detail,
                    hint: None,
                }
            }
            Err(DeliveryError::Other { detail }) => {
                tracing::warn!(to = %to, detail = %detail, "Message rejected");
                SendResult::Failed {
                    kind: FailureKind::OtherError,
                    detail,
                    hint: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_result_serializes_with_outcome_tag() {
        let sent = SendResult::Sent {
            message_id: "<1.2@x>".to_string(),
        };
        let json = serde_json::to_value(&sent).unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["message_id"], "<1.2@x>");

        let failed = SendResult::Failed {
            kind: FailureKind::AuthError,
            detail: "535 rejected".to_string(),
            hint: Some(crate::channel::AUTH_HINT),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["kind"], "auth_error");
        assert!(json["hint"].as_str().unwrap().contains("app-specific"));
    }
}
