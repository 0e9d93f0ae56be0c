//! Outbound email transports.
//!
//! The `Mailer` trait is the seam between message composition and SMTP so
//! the dispatcher's fallback logic can be tested with recording mocks.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SmtpConfig;

/// Errors raised by a transport while sending a single message.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// An interchangeable send function: (recipient, subject, html, text) in,
/// delivery identifier out, or an error.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<String, TransportError>;

    /// Whether this transport has enough configuration to attempt a send.
    fn is_configured(&self) -> bool {
        true
    }
}

/// SMTP transport backed by lettre.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let host = self
            .config
            .smtp_host
            .as_ref()
            .ok_or_else(|| TransportError::Unavailable("SMTP host not configured".to_string()))?;

        let builder = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        }
        .port(self.config.smtp_port);

        let builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<String, TransportError> {
        let from_address = self.config.from_address.as_ref().ok_or_else(|| {
            TransportError::Unavailable("From address not configured".to_string())
        })?;

        let from: Mailbox = format!("{} <{}>", self.config.from_name, from_address).parse()?;
        let to: Mailbox = to.parse()?;
        let message_id = format!("<{}@planora>", Uuid::new_v4());

        let email = Message::builder()
            .from(from)
            .to(to)
            .message_id(Some(message_id.clone()))
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )?;

        self.transport()?.send(email).await?;

        Ok(message_id)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
