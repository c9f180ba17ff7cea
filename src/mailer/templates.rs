use crate::models::CcApplication;

use super::MailMessage;

pub const APPLICANT_CONFIRMATION_SUBJECT: &str = "Clubs Council Recruitment: Application Received";
pub const CC_APPLICANT_NOTIFICATION_SUBJECT: &str = "Clubs Council Recruitment: New Application";

const NOT_PROVIDED: &str = "N/A";

const APPLICANT_CONFIRMATION_BODY: &str = "\
Hello,

Thank you for applying to the Clubs Council. We have received your application
and the team will get in touch with you about the next steps of the recruitment
process.

Regards,
Clubs Council";

/// Sent to the applicant right after the application is stored.
pub fn applicant_confirmation(application: &CcApplication) -> MailMessage {
    MailMessage::new(
        APPLICANT_CONFIRMATION_SUBJECT,
        APPLICANT_CONFIRMATION_BODY,
        vec![application.email.clone()],
    )
    .with_uid(&application.uid)
}

/// Internal copy of the full application for the council inbox.
pub fn cc_applicant_notification(application: &CcApplication, recipient: &str) -> MailMessage {
    let teams = application
        .teams()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let teams = if teams.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        teams
    };

    let body = format!(
        "\
A new application for the Clubs Council has been submitted.

User ID: {uid}
Email: {email}
Teams: {teams}

Why this position?
{why_this_position}

Design experience:
{design_experience}

Why the Clubs Council?
{why_cc}

Why are you a good fit?
{good_fit}

Ideas:
{ideas}

Other bodies:
{other_bodies}",
        uid = application.uid,
        email = application.email,
        why_this_position = application.why_this_position,
        design_experience = application
            .design_experience
            .as_deref()
            .unwrap_or(NOT_PROVIDED),
        why_cc = application.why_cc,
        good_fit = application.good_fit,
        ideas = application.ideas,
        other_bodies = application.other_bodies.as_deref().unwrap_or(NOT_PROVIDED),
    );

    MailMessage::new(
        CC_APPLICANT_NOTIFICATION_SUBJECT,
        body,
        vec![recipient.to_string()],
    )
    .with_uid(&application.uid)
}
