//! Outbound user notifications.
//!
//! - [`mailer`] -- verification codes and password reset links over SMTP.

pub mod mailer;

pub use mailer::{EmailConfig, EmailError, Mailer};
