//! Outbound mail behind a trait seam. SMTP when credentials are configured,
//! otherwise a logging fallback so development setups work without a relay.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, code: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(cfg.smtp_port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        Ok(Self {
            transport,
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to: &str, code: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|_| MailError::Address(self.from.clone()))?)
            .to(to.parse().map_err(|_| MailError::Address(to.to_string()))?)
            .subject("Password reset code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your password reset code is {code}.\n\
                 It expires in 30 minutes.\n\n\
                 If you did not request a reset, you can ignore this message.\n"
            ))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!("password reset email sent to {}", to);
        Ok(())
    }
}

/// Fallback used when SMTP is not configured: the code only reaches the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, code: &str) -> Result<(), MailError> {
        tracing::info!("mail disabled; password reset code for {} is {}", to, code);
        Ok(())
    }
}

pub fn from_config(cfg: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    if cfg.smtp_host.is_empty() || cfg.username.is_empty() {
        tracing::warn!("SMTP not configured, password reset codes will only be logged");
        return Ok(Arc::new(LogMailer));
    }
    Ok(Arc::new(SmtpMailer::new(cfg)?))
}
