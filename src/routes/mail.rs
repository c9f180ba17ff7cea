use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::identity::RequestContext;
use crate::mailer::MailMessage;
use crate::models::NewMailRecord;
use crate::permissions::{authorize, Operation};
use crate::state::AppState;
use crate::tasks::DeferredTasks;

const MAX_UID_LENGTH: usize = 100;

#[derive(Debug, Deserialize)]
pub struct MailInput {
    pub subject: String,
    pub body: String,
    pub to_recipients: Vec<String>,
    #[serde(default)]
    pub cc_recipients: Vec<String>,
    pub uid: Option<String>,
    #[serde(default)]
    pub html_body: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendMailRequest {
    pub mail_input: MailInput,
    #[serde(default)]
    pub inter_communication_secret: Option<String>,
}

fn trimmed_addresses(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .collect()
}

pub async fn send_mail(
    State(state): State<AppState>,
    context: RequestContext,
    Extension(tasks): Extension<DeferredTasks>,
    AppJson(request): AppJson<SendMailRequest>,
) -> AppResult<Json<bool>> {
    let user = authorize(Operation::SendMail, &context)?;

    if request.inter_communication_secret.as_deref()
        != Some(state.config.inter_communication_secret.as_str())
    {
        return Err(AppError::invalid_secret());
    }

    let input = request.mail_input;
    let uid = input
        .uid
        .map(|uid| uid.trim().to_string())
        .filter(|uid| !uid.is_empty())
        .unwrap_or_else(|| user.uid.clone());
    if uid.chars().count() > MAX_UID_LENGTH {
        return Err(AppError::bad_request(format!(
            "uid must be at most {MAX_UID_LENGTH} characters"
        )));
    }

    let mut message = MailMessage::new(
        input.subject.trim(),
        input.body,
        trimmed_addresses(input.to_recipients),
    )
    .with_uid(uid);
    message.cc = trimmed_addresses(input.cc_recipients);
    message.html = input.html_body;
    message.validate().map_err(AppError::bad_request)?;

    if let Some(mail_log) = state.mail_log.as_ref() {
        mail_log
            .record(NewMailRecord {
                id: Uuid::new_v4(),
                uid: message.uid.clone(),
                subject: message.subject.clone(),
                body: message.body.clone(),
                to_recipients: message.to.clone(),
                cc_recipients: message.cc.clone(),
                html_body: message.html,
                sent_time: message.sent_time.naive_utc(),
            })
            .await?;
    }

    info!(
        uid = ?message.uid,
        recipients = message.to.len() + message.cc.len(),
        "queued outgoing mail"
    );
    tasks.send_mail(message);

    Ok(Json(true))
}
