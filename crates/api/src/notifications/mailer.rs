//! Account emails sent via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport. When `SMTP_HOST` is not
//! set the mailer is disabled and writes each message to the log instead, so
//! local accounts can still be verified in development.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use judiguard_core::one_time_codes::{OTP_TTL_MINS, RESET_TOKEN_TTL_MINS};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "noreply@judiguard.local";

/// Configuration for SMTP delivery.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// Defaults to 587 (STARTTLS).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default                    |
    /// |-----------------|----------|----------------------------|
    /// | `SMTP_HOST`     | yes      | --                         |
    /// | `SMTP_PORT`     | no       | `587`                      |
    /// | `SMTP_FROM`     | no       | `noreply@judiguard.local`  |
    /// | `SMTP_USER`     | no       | --                         |
    /// | `SMTP_PASSWORD` | no       | --                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Subject and plain-text body of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

pub fn verification_email(username: &str, code: &str) -> EmailContent {
    EmailContent {
        subject: "[Judi Guard] Your verification code".to_string(),
        body: format!(
            "Hi {username},\n\nYour verification code is {code}.\n\
             It expires in {OTP_TTL_MINS} minutes.\n\n\
             If you did not create a Judi Guard account, you can ignore this email."
        ),
    }
}

pub fn password_reset_email(username: &str, reset_link: &str) -> EmailContent {
    EmailContent {
        subject: "[Judi Guard] Reset your password".to_string(),
        body: format!(
            "Hi {username},\n\nOpen the link below to choose a new password:\n{reset_link}\n\n\
             The link expires in {RESET_TOKEN_TTL_MINS} minutes and can be used once.\n\
             If you did not request a reset, you can ignore this email."
        ),
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends account emails, or logs them when SMTP is not configured.
pub struct Mailer {
    config: Option<EmailConfig>,
}

impl Mailer {
    pub fn new(config: Option<EmailConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("SMTP_HOST not set; account emails will be logged instead of sent");
        }
        Self { config }
    }

    /// A mailer that only logs.
    pub fn disabled() -> Self {
        Self { config: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    pub async fn send_verification_code(
        &self,
        to_email: &str,
        username: &str,
        code: &str,
    ) -> Result<(), EmailError> {
        self.send(to_email, verification_email(username, code)).await
    }

    pub async fn send_password_reset(
        &self,
        to_email: &str,
        username: &str,
        reset_link: &str,
    ) -> Result<(), EmailError> {
        self.send(to_email, password_reset_email(username, reset_link))
            .await
    }

    async fn send(&self, to_email: &str, content: EmailContent) -> Result<(), EmailError> {
        let Some(config) = &self.config else {
            tracing::info!(
                to = to_email,
                subject = %content.subject,
                body = %content.body,
                "SMTP disabled, email not sent"
            );
            return Ok(());
        };

        let email = Message::builder()
            .from(config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(content.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(content.body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        transport_builder.build().send(email).await?;

        tracing::info!(to = to_email, subject = %content.subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
