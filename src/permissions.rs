use crate::error::{AppError, AppResult};
use crate::identity::{Identity, RequestContext, Role};

const EVERY_ROLE: &[Role] = &Role::ALL;
const CC_ONLY: &[Role] = &[Role::Cc];
const PUBLIC_ONLY: &[Role] = &[Role::Public];
const MAIL_SENDERS: &[Role] = &[Role::Cc, Role::Club, Role::Slo, Role::Slc];

/// Operations that require a logged-in caller. `storagefiles` and
/// `storagefile` are open to everyone and are not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SignedUploadUrl,
    CcApplications,
    HaveAppliedForCc,
    CcApply,
    SendMail,
    CreateStorageFile,
    UpdateStorageFile,
    DeleteStorageFile,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::SignedUploadUrl,
        Operation::CcApplications,
        Operation::HaveAppliedForCc,
        Operation::CcApply,
        Operation::SendMail,
        Operation::CreateStorageFile,
        Operation::UpdateStorageFile,
        Operation::DeleteStorageFile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::SignedUploadUrl => "signedUploadURL",
            Operation::CcApplications => "ccApplications",
            Operation::HaveAppliedForCc => "haveAppliedForCC",
            Operation::CcApply => "ccApply",
            Operation::SendMail => "sendMail",
            Operation::CreateStorageFile => "createStorageFile",
            Operation::UpdateStorageFile => "updateStorageFile",
            Operation::DeleteStorageFile => "deleteStorageFile",
        }
    }

    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::SignedUploadUrl => EVERY_ROLE,
            Operation::CcApplications => CC_ONLY,
            Operation::HaveAppliedForCc | Operation::CcApply => PUBLIC_ONLY,
            Operation::SendMail => MAIL_SENDERS,
            Operation::CreateStorageFile
            | Operation::UpdateStorageFile
            | Operation::DeleteStorageFile => CC_ONLY,
        }
    }
}

/// Resolves the caller and checks it against the operation's allow-list.
pub fn authorize(operation: Operation, context: &RequestContext) -> AppResult<&Identity> {
    let Some(user) = context.user() else {
        return Err(AppError::unauthenticated());
    };

    if !user.has_role(operation.allowed_roles()) {
        tracing::warn!(
            operation = operation.name(),
            uid = %user.uid,
            role = ?user.role,
            "caller role not permitted"
        );
        return Err(AppError::unauthorized());
    }

    Ok(user)
}
