//! AWS SES email sending service

use std::future::Future;

use aws_config::{meta::region::RegionProviderChain, BehaviorVersion};
use aws_sdk_sesv2::{
    config::Region,
    types::{Body, Content, Destination, EmailContent, Message},
    Client,
};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::APP_CONFIG;

static SES_CLIENT: OnceCell<Client> = OnceCell::const_new();

async fn get_ses_client() -> &'static Client {
    SES_CLIENT
        .get_or_init(|| async {
            let region = &APP_CONFIG.aws_region;

            let region_provider = RegionProviderChain::first_try(Region::new(region.clone()))
                .or_default_provider()
                .or_else(Region::new(region.clone()));

            let config = aws_config::defaults(BehaviorVersion::latest())
                .region(region_provider)
                .load()
                .await;

            Client::new(&config)
        })
        .await
}

#[derive(Debug, Error)]
pub enum SendEmailError {
    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SES SDK error: {0}")]
    Sdk(String),
}

/// Outbound mail capability.
///
/// The reminder sweep only depends on this seam, so tests can observe
/// dispatches without a network.
pub trait MailSender: Send + Sync + 'static {
    fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), SendEmailError>> + Send;
}

/// Sends a plain-text email via AWS SES.
async fn send_email(
    sender: &str,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<(), SendEmailError> {
    let client = get_ses_client().await;

    let subject_content = Content::builder()
        .data(subject)
        .charset("UTF-8")
        .build()
        .map_err(|e| SendEmailError::Build(format!("subject: {e:?}")))?;

    let body_content = Content::builder()
        .data(body)
        .charset("UTF-8")
        .build()
        .map_err(|e| SendEmailError::Build(format!("body: {e:?}")))?;

    let message = Message::builder()
        .subject(subject_content)
        .body(Body::builder().text(body_content).build())
        .build();

    client
        .send_email()
        .from_email_address(sender)
        .destination(Destination::builder().to_addresses(recipient).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map_err(|e| SendEmailError::Sdk(format!("{e:?}")))?;

    Ok(())
}

/// SES-backed `MailSender` used in production.
#[derive(Clone)]
pub struct SesMailer {
    from_email: String,
}

impl SesMailer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            from_email: APP_CONFIG.ses_from_email.clone(),
        }
    }
}

impl Default for SesMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl MailSender for SesMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), SendEmailError> {
        send_email(&self.from_email, recipient, subject, body).await
    }
}
