//! Mail delivery through the Microsoft Graph `sendMail` endpoint.
//!
//! Every send runs a fresh client-credentials token exchange against the
//! configured tenant. Graph answers `202 Accepted` when it has queued the
//! message; anything else counts as a failed send.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::{MailMessage, Mailer};
use crate::config::MailConfig;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("token request rejected with status {status}: {body}")]
    Auth { status: StatusCode, body: String },
    #[error("mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GraphMailer {
    client: Client,
    config: MailConfig,
}

impl GraphMailer {
    pub fn new(config: MailConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: MailConfig) -> Self {
        Self { client, config }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.config.authority_url.trim_end_matches('/'),
            self.config.tenant_id
        )
    }

    fn send_mail_url(&self) -> String {
        format!(
            "{}/v1.0/users/{}/sendMail",
            self.config.graph_api_url.trim_end_matches('/'),
            self.config.sender_email
        )
    }

    pub async fn acquire_token(&self) -> Result<String, MailerError> {
        let response = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Auth { status, body });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn deliver(&self, message: &MailMessage) -> Result<(), MailerError> {
        let token = self.acquire_token().await?;

        let response = self
            .client
            .post(self.send_mail_url())
            .bearer_auth(token)
            .json(&message_payload(message))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl Mailer for GraphMailer {
    async fn send_mail(&self, message: &MailMessage) -> bool {
        match self.deliver(message).await {
            Ok(()) => {
                info!(
                    subject = %message.subject,
                    recipients = message.to.len() + message.cc.len(),
                    "mail accepted by provider"
                );
                true
            }
            Err(err) => {
                warn!(subject = %message.subject, error = %err, "mail send failed");
                false
            }
        }
    }
}

fn recipients(addresses: &[String]) -> Vec<Value> {
    addresses
        .iter()
        .map(|address| json!({ "emailAddress": { "address": address } }))
        .collect()
}

fn message_payload(message: &MailMessage) -> Value {
    let content_type = if message.html { "HTML" } else { "Text" };
    json!({
        "message": {
            "subject": message.subject,
            "body": {
                "contentType": content_type,
                "content": message.body,
            },
            "toRecipients": recipients(&message.to),
            "ccRecipients": recipients(&message.cc),
        },
        "saveToSentItems": true,
    })
}
