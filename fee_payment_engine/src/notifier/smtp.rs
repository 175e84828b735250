use std::{path::Path, sync::Arc};

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;

use super::{MailerConfig, SmtpTls};
use crate::traits::{NotifyError, ReceiptNotifier};

pub const RECEIPT_EMAIL_SUBJECT: &str = "Your School Fee Payment Receipt";
pub const RECEIPT_EMAIL_BODY: &str = "Thank you for your payment. Please find your receipt attached.";

/// Sends receipts through an SMTP relay. The transport pools its connections, so one notifier should be shared.
#[derive(Clone)]
pub struct SmtpNotifier {
    sender: Option<Mailbox>,
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpNotifier {
    pub fn new(config: &MailerConfig) -> Result<Self, NotifyError> {
        let builder = match config.tls {
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)),
        }
        .map_err(|e| NotifyError::TransportError(e.to_string()))?;
        let mut builder = builder.port(config.port).timeout(Some(config.timeout));
        if let Some(username) = &config.username {
            builder = builder.credentials(Credentials::new(username.clone(), config.password.reveal().clone()));
        }
        let sender = match &config.username {
            Some(user) => Some(user.parse::<Mailbox>().map_err(|e| NotifyError::InvalidAddress(format!("{user}: {e}")))?),
            None => None,
        };
        debug!("📧️ SMTP notifier configured for {}:{} ({})", config.host, config.port, config.tls);
        Ok(Self { sender, transport: Arc::new(builder.build()) })
    }
}

impl ReceiptNotifier for SmtpNotifier {
    async fn send(&self, to: &str, document: &Path) -> Result<(), NotifyError> {
        let sender = self
            .sender
            .clone()
            .ok_or_else(|| NotifyError::MessageError("No sender address is configured (FEE_EMAIL_USER)".into()))?;
        let message = build_receipt_message(sender, to, document).await?;
        self.transport.send(message).await.map_err(|e| NotifyError::TransportError(e.to_string()))?;
        info!("📧️ Receipt {} sent to {to}", document.display());
        Ok(())
    }
}

/// Builds the receipt email with `document` attached as a PDF under its own file name.
pub async fn build_receipt_message(from: Mailbox, to: &str, document: &Path) -> Result<Message, NotifyError> {
    let recipient = to.parse::<Mailbox>().map_err(|e| NotifyError::InvalidAddress(format!("{to}: {e}")))?;
    let attachment_error =
        |reason: String| NotifyError::AttachmentError { path: document.display().to_string(), reason };
    let content = tokio::fs::read(document).await.map_err(|e| attachment_error(e.to_string()))?;
    let file_name = document
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .ok_or_else(|| attachment_error("the path has no file name".into()))?;
    let pdf = ContentType::parse("application/pdf").map_err(|e| NotifyError::MessageError(e.to_string()))?;
    Message::builder()
        .from(from)
        .to(recipient)
        .subject(RECEIPT_EMAIL_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(RECEIPT_EMAIL_BODY.to_string()))
                .singlepart(Attachment::new(file_name).body(content, pdf)),
        )
        .map_err(|e| NotifyError::MessageError(e.to_string()))
}
