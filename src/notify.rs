//! Outbound mail: the sender port, its SMTP adapter and the new-listing template.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::model::user::User;
use crate::model::waste::Listing;

pub const NEW_LISTING_SUBJECT: &str = "New Agricultural Waste Posted";

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("mail credentials are not configured")]
    NotConfigured,
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("could not build message: {0}")]
    Message(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// Delivers a single message. Implementations must be safe to call from
/// many tasks at once.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        smtp_host: &str,
        username: &str,
        password: &str,
        sender_name: &str,
    ) -> Result<Self, NotificationError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| NotificationError::Smtp(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        let address: lettre::Address = username.parse().map_err(|e: lettre::address::AddressError| {
            NotificationError::Address {
                address: username.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            transport,
            from: Mailbox::new(Some(sender_name.to_string()), address),
        })
    }
}

#[async_trait]
impl NotificationSender for SmtpMailer {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let to: Mailbox = notification.to.parse().map_err(|e: lettre::address::AddressError| {
            NotificationError::Address {
                address: notification.to.clone(),
                reason: e.to_string(),
            }
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject)
            .header(ContentType::TEXT_HTML)
            .body(notification.html)
            .map_err(|e| NotificationError::Message(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;
        Ok(())
    }
}

/// Stands in for the mailer when no credentials were supplied, so every
/// attempt is still logged as a failure.
pub struct DisabledSender;

#[async_trait]
impl NotificationSender for DisabledSender {
    async fn send(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::NotConfigured)
    }
}

pub fn render_new_listing(company: &User, listing: &Listing) -> Notification {
    let html = format!(
        "<p>Hello {name},</p>\n\
         <p>A new waste has been posted:</p>\n\
         <ul>\n\
         <li><strong>Title:</strong> {title}</li>\n\
         <li><strong>Quantity:</strong> {quantity} kg</li>\n\
         <li><strong>Location:</strong> {location}</li>\n\
         <li><strong>Contact:</strong> {contact}</li>\n\
         </ul>\n\
         <p>Visit your dashboard to respond.</p>\n",
        name = escape_html(&company.name),
        title = escape_html(&listing.title),
        quantity = listing.quantity,
        location = escape_html(&listing.location),
        contact = escape_html(&listing.contact),
    );

    Notification {
        to: company.email.clone(),
        subject: NEW_LISTING_SUBJECT.to_string(),
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
