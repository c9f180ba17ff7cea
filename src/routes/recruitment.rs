use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::identity::RequestContext;
use crate::mailer::templates;
use crate::models::{CcApplication, NewCcApplication, Team};
use crate::permissions::{authorize, Operation};
use crate::state::AppState;
use crate::store::StoreError;
use crate::tasks::DeferredTasks;

/// Earliest year accepted by the year filters.
pub const MIN_APPLY_YEAR: i32 = 2024;
const MAX_UID_LENGTH: usize = 100;

#[derive(Debug, Deserialize, Validate)]
pub struct CcApplicationInput {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    pub design_experience: Option<String>,
    #[validate(length(min = 1, message = "why_this_position is required"))]
    pub why_this_position: String,
    #[validate(length(min = 1, message = "why_cc is required"))]
    pub why_cc: String,
    #[validate(length(min = 1, message = "ideas is required"))]
    pub ideas: String,
    pub other_bodies: Option<String>,
    #[validate(length(min = 1, message = "good_fit is required"))]
    pub good_fit: String,
}

impl CcApplicationInput {
    /// Trims every text field, drops blank optionals and repeated teams.
    fn normalized(self) -> Self {
        let mut teams = Vec::with_capacity(self.teams.len());
        for team in self.teams {
            if !teams.contains(&team) {
                teams.push(team);
            }
        }

        Self {
            email: self.email.trim().to_string(),
            teams,
            design_experience: non_blank(self.design_experience),
            why_this_position: self.why_this_position.trim().to_string(),
            why_cc: self.why_cc.trim().to_string(),
            ideas: self.ideas.trim().to_string(),
            other_bodies: non_blank(self.other_bodies),
            good_fit: self.good_fit.trim().to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[derive(Debug, Serialize)]
pub struct CcApplicationResponse {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub teams: Vec<Team>,
    pub design_experience: Option<String>,
    pub why_this_position: String,
    pub why_cc: String,
    pub ideas: String,
    pub other_bodies: Option<String>,
    pub good_fit: String,
    pub apply_year: i32,
    pub sent_time: DateTime<Utc>,
}

impl From<CcApplication> for CcApplicationResponse {
    fn from(application: CcApplication) -> Self {
        Self {
            teams: application.teams(),
            id: application.id,
            uid: application.uid,
            email: application.email,
            design_experience: application.design_experience,
            why_this_position: application.why_this_position,
            why_cc: application.why_cc,
            ideas: application.ideas,
            other_bodies: application.other_bodies,
            good_fit: application.good_fit,
            apply_year: application.apply_year,
            sent_time: application.sent_time.and_utc(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

fn checked_year(year: i32) -> AppResult<i32> {
    if year < MIN_APPLY_YEAR {
        return Err(AppError::bad_request(format!(
            "Invalid year: applications start in {MIN_APPLY_YEAR}"
        )));
    }
    Ok(year)
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

pub async fn cc_apply(
    State(state): State<AppState>,
    context: RequestContext,
    Extension(tasks): Extension<DeferredTasks>,
    AppJson(input): AppJson<CcApplicationInput>,
) -> AppResult<Json<bool>> {
    let user = authorize(Operation::CcApply, &context)?;
    if user.uid.chars().count() > MAX_UID_LENGTH {
        return Err(AppError::bad_request(format!(
            "uid must be at most {MAX_UID_LENGTH} characters"
        )));
    }

    let input = input.normalized();
    input.validate()?;

    let apply_year = current_year();
    if state
        .applications
        .find_for_year(&user.uid, apply_year)
        .await?
        .is_some()
    {
        return Err(AppError::duplicate_application());
    }

    let new_application = NewCcApplication {
        id: Uuid::new_v4(),
        uid: user.uid.clone(),
        email: input.email,
        teams: input
            .teams
            .iter()
            .map(|team| team.as_str().to_string())
            .collect(),
        design_experience: input.design_experience,
        why_this_position: input.why_this_position,
        why_cc: input.why_cc,
        ideas: input.ideas,
        other_bodies: input.other_bodies,
        good_fit: input.good_fit,
        apply_year,
        sent_time: Utc::now().naive_utc(),
    };

    // A concurrent submission can pass the check above; the unique index decides.
    let application = match state.applications.insert(new_application).await {
        Ok(application) => application,
        Err(StoreError::Conflict) => return Err(AppError::duplicate_application()),
        Err(err) => return Err(err.into()),
    };

    info!(
        application_id = %application.id,
        uid = %application.uid,
        apply_year,
        "stored cc application"
    );

    tasks.send_mail(templates::applicant_confirmation(&application));
    tasks.send_mail(templates::cc_applicant_notification(
        &application,
        &state.config.cc_notification_email,
    ));

    Ok(Json(true))
}

pub async fn cc_applications(
    State(state): State<AppState>,
    context: RequestContext,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<Vec<CcApplicationResponse>>> {
    authorize(Operation::CcApplications, &context)?;
    let year = query.year.map(checked_year).transpose()?;

    let applications = state.applications.list(year).await?;
    Ok(Json(
        applications
            .into_iter()
            .map(CcApplicationResponse::from)
            .collect(),
    ))
}

pub async fn have_applied_for_cc(
    State(state): State<AppState>,
    context: RequestContext,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<bool>> {
    let user = authorize(Operation::HaveAppliedForCc, &context)?;
    let year = checked_year(query.year.unwrap_or_else(current_year))?;

    let existing = state.applications.find_for_year(&user.uid, year).await?;
    Ok(Json(existing.is_some()))
}
