//! Outgoing email: composition and delivery through Resend.
//!
//! Two messages per accepted submission:
//!
//! - the **notification** to the studio mailbox, in English, reply-to the
//!   submitter so answering goes straight back to them;
//! - the **confirmation** to the submitter, in their language, with a copy
//!   of what they sent.
//!
//! Bodies are rendered with maud, so submitted text is escaped. Message
//! line breaks become `<br>`.

use async_trait::async_trait;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::submission::Submission;
use crate::i18n::{Catalog, Locale};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email service answered HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// One message, shaped as the Resend `POST /emails` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message and return the provider's message id.
    async fn send(&self, email: &Email) -> Result<String, MailError>;
}

pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Deserialize)]
struct Sent {
    id: String,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &Email) -> Result<String, MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<Sent>().await?.id)
    }
}

/// Addresses and links the messages are built with.
#[derive(Debug, Clone)]
pub struct Letterhead {
    /// Studio mailbox receiving notifications.
    pub contact_email: String,
    /// Sender mailbox, e.g. `noreply@lumalima.com`.
    pub sender: String,
    pub site_name: String,
    pub tagline: String,
    pub site_url: String,
}

impl Letterhead {
    fn notification_from(&self) -> String {
        format!("Contact Form <{}>", self.sender)
    }

    fn confirmation_from(&self) -> String {
        format!("{} <{}>", self.site_name, self.sender)
    }
}

/// The project type in the submitter's language, if one was picked.
/// Unknown values are shown as sent.
fn project_type_label(catalog: &Catalog, locale: Locale, project_type: &str) -> Option<String> {
    if project_type.is_empty() {
        return None;
    }
    let key = format!("category.{project_type}");
    Some(catalog.t_or(locale, &key, project_type).to_string())
}

fn message_lines(message: &str) -> Markup {
    html! {
        @for (i, line) in message.split('\n').enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}

/// The message to the studio.
pub fn notification(submission: &Submission, catalog: &Catalog, letterhead: &Letterhead) -> Email {
    let project = project_type_label(catalog, submission.locale(), &submission.project_type);
    let body = html! {
        h2 { "New Contact Form Submission" }
        p { strong { "Name:" } " " (submission.name) }
        p { strong { "Email:" } " " (submission.email) }
        p { strong { "Project Type:" } " " (project.as_deref().unwrap_or("Not specified")) }
        p { strong { "Language:" } " " (submission.language.to_uppercase()) }
        p { strong { "Message:" } }
        p { (message_lines(&submission.message)) }
        hr;
        p { small { "Sent from " (letterhead.site_name) " contact form" } }
    };

    Email {
        from: letterhead.notification_from(),
        to: vec![letterhead.contact_email.clone()],
        subject: format!(
            "New Contact Form Submission - {}",
            project.as_deref().unwrap_or("General Inquiry")
        ),
        html: body.into_string(),
        reply_to: Some(submission.email.clone()),
    }
}

/// The copy sent back to the submitter, in their language.
pub fn confirmation(submission: &Submission, catalog: &Catalog, letterhead: &Letterhead) -> Email {
    let locale = submission.locale();
    let t = |key: &str| catalog.t(locale, key).to_string();
    let project = project_type_label(catalog, locale, &submission.project_type);
    // Catalog sign-offs use <br> for their line break
    let footer = t("email.confirmation.footer");

    let body = html! {
        div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; color: #1d1d1f;" {
            div style="text-align: center; margin-bottom: 30px;" {
                h1 style="font-size: 32px; font-weight: 300; margin: 0;" { (letterhead.site_name) }
                p style="color: #86868b; margin: 5px 0 0 0;" { (letterhead.tagline) }
            }
            h2 style="font-weight: 500; margin-bottom: 20px;" {
                (t("email.confirmation.greeting")) " " (submission.name) ","
            }
            p style="line-height: 1.6; margin-bottom: 20px;" { (t("email.confirmation.body1")) }
            div style="background-color: #f5f5f7; border-radius: 12px; padding: 20px; margin: 20px 0;" {
                h3 style="margin-top: 0;" { (t("email.confirmation.body2")) }
                p {
                    strong { (t("email.confirmation.projectType")) ":" }
                    " " (project.as_deref().unwrap_or("Not specified"))
                }
                p { strong { (t("email.confirmation.message")) ":" } }
                p style="background-color: white; padding: 15px; border-radius: 8px; margin: 10px 0;" {
                    (message_lines(&submission.message))
                }
            }
            p style="line-height: 1.6; margin: 30px 0 20px 0;" {
                @for (i, line) in footer.split("<br>").enumerate() {
                    @if i > 0 { br; }
                    (line)
                }
            }
            div style="text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #d2d2d7;" {
                a href=(letterhead.site_url) style="color: #007aff; text-decoration: none;" {
                    (t("email.confirmation.website"))
                }
            }
        }
    };

    Email {
        from: letterhead.confirmation_from(),
        to: vec![submission.email.clone()],
        subject: t("email.confirmation.subject"),
        html: body.into_string(),
        reply_to: None,
    }
}
