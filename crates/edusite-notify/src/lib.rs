//! Edusite Notification Dispatch Service
//!
//! This crate renders parametrized HTML templates through a lazily-populated,
//! process-lifetime cache and delivers them over a pooled SMTP channel.
//!
//! Every dispatch returns a structured [`SendResult`]; no error escapes the
//! `send`/`send_raw` boundary as a panic or a transport library error. The
//! outbound channel sits behind the [`MailChannel`] trait so tests and
//! callers can substitute doubles for the pooled SMTP transport.
//!
//! No retry is performed here. Retry policy belongs to the caller: blindly
//! retrying an authentication failure or a malformed recipient is never
//! productive, and hiding that decision inside the dispatcher would be worse
//! than surfacing it.

pub mod channel;
pub mod dispatch;
pub mod template;

// Re-export commonly used types
pub use channel::{Attachment, DeliveryError, Envelope, MailChannel, SmtpChannel, AUTH_HINT};
pub use dispatch::{FailureKind, Notifier, SendResult};
pub use template::TemplateStore;
