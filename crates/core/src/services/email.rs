//! Email service.
//!
//! Thin wrapper over an async SMTP transport. Configuration is optional:
//! without it the service reports itself disabled and every send fails
//! server-class. Sends are never retried here.

use dynstory_common::{AppError, AppResult, config::EmailConfig};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::Mailbox, transport::smtp::authentication::Credentials,
};

/// Email service for outbound mail.
#[derive(Clone)]
pub struct EmailService {
    config: Option<EmailConfig>,
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    /// Create a new email service. `None` config disables sending.
    pub fn new(config: Option<EmailConfig>) -> AppResult<Self> {
        let mailer = match &config {
            Some(cfg) => Some(
                AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
                    .map_err(|e| AppError::Email(format!("SMTP relay setup failed: {e}")))?
                    .credentials(Credentials::new(
                        cfg.smtp_username.clone(),
                        cfg.smtp_password.clone(),
                    ))
                    .build(),
            ),
            None => None,
        };

        Ok(Self { config, mailer })
    }

    /// Whether SMTP is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Send the account-activation email.
    pub async fn send_activation(
        &self,
        username: &str,
        to: &str,
        activation_id: &str,
    ) -> AppResult<()> {
        let (config, mailer) = self.transport()?;

        let message = Message::builder()
            .from(parse_mailbox(&config.main_address)?)
            .to(parse_mailbox(to)?)
            .subject("Thanks for signing up for an account on dynstory!")
            .body(activation_body(username, activation_id))
            .map_err(|e| AppError::Email(format!("Failed to build message: {e}")))?;

        mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| AppError::Email(format!("Send failed: {e}")))
    }

    /// Send a feedback email to the configured main address, reply-to the
    /// submitting user.
    pub async fn send_feedback(&self, username: &str, reply_to: &str, body: &str) -> AppResult<()> {
        let (config, mailer) = self.transport()?;

        let message = Message::builder()
            .from(parse_mailbox(&config.main_address)?)
            .to(parse_mailbox(&config.main_address)?)
            .reply_to(parse_mailbox(reply_to)?)
            .subject(format!("dynstory feedback from {username}"))
            .body(body.to_string())
            .map_err(|e| AppError::Email(format!("Failed to build message: {e}")))?;

        mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| AppError::Email(format!("Send failed: {e}")))
    }

    fn transport(&self) -> AppResult<(&EmailConfig, &AsyncSmtpTransport<Tokio1Executor>)> {
        match (&self.config, &self.mailer) {
            (Some(config), Some(mailer)) => Ok((config, mailer)),
            _ => Err(AppError::Email("SMTP is not configured.".to_string())),
        }
    }
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::Email(format!("Invalid mailbox {address:?}: {e}")))
}

fn activation_body(username: &str, activation_id: &str) -> String {
    let url = "https://dynstory.org/user/activate/";

    format!(
        "Hey {username},\n\n\
         Welcome to dynstory! You are awesome!\n\n\
         Click on the following URL to activate your account: {url}{activation_id}\n\n\
         Alternatively, you can visit {url} and type in the following \
         Activation ID when asked:\n\
         Activation ID: {activation_id}\n\n\
         The dynstory Team"
    )
}
