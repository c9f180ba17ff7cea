use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::ValidateEmail;

pub mod graph;
pub mod templates;

pub use graph::{GraphMailer, MailerError};

pub const MAX_SUBJECT_LENGTH: usize = 100;

/// A single outgoing email. Built, handed to a [`Mailer`], then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub uid: Option<String>,
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub html: bool,
    pub sent_time: DateTime<Utc>,
}

impl MailMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            uid: None,
            subject: subject.into(),
            body: body.into(),
            to,
            cc: Vec::new(),
            html: false,
            sent_time: Utc::now(),
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject must not be empty".into());
        }
        if self.subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(format!(
                "subject must be at most {MAX_SUBJECT_LENGTH} characters"
            ));
        }
        if self.to.is_empty() {
            return Err("at least one recipient is required in 'to_recipients'".into());
        }
        validate_recipients("to_recipients", &self.to)?;
        validate_recipients("cc_recipients", &self.cc)
    }
}

/// Every entry must be an email address and appear only once
/// (compared case-insensitively).
pub fn validate_recipients(field: &str, recipients: &[String]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(recipients.len());
    for recipient in recipients {
        if !recipient.validate_email() {
            return Err(format!("'{recipient}' in '{field}' is not a valid email"));
        }
        if !seen.insert(recipient.to_lowercase()) {
            return Err(format!("Duplicate Emails are not allowed in '{field}'"));
        }
    }
    Ok(())
}

/// Delivers mail. Failures are reported through the return value only.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send_mail(&self, message: &MailMessage) -> bool;
}
