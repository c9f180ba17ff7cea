//! Caller identity forwarded by the gateway.
//!
//! The gateway injects two JSON headers: `user` (role and uid of the caller)
//! and `cookies`. Neither is verified here. A missing header, or `{}`, means
//! the caller is not logged in.

use std::fmt;
use std::str::FromStr;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

pub const USER_HEADER: &str = "user";
pub const COOKIES_HEADER: &str = "cookies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Public,
    Club,
    Cc,
    Slo,
    Slc,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Public, Role::Club, Role::Cc, Role::Slo, Role::Slc];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Public => "public",
            Role::Club => "club",
            Role::Cc => "cc",
            Role::Slo => "slo",
            Role::Slc => "slc",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| format!("unknown role {value}"))
    }
}

#[derive(Deserialize)]
struct UserHeader {
    uid: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    /// `None` when the gateway sent no role or one this service does not know.
    pub role: Option<Role>,
    raw: Map<String, Value>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, role: Role) -> Self {
        let uid = uid.into();
        let mut raw = Map::new();
        raw.insert("uid".into(), Value::String(uid.clone()));
        raw.insert("role".into(), Value::String(role.as_str().into()));
        Self {
            uid,
            role: Some(role),
            raw,
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role.is_some_and(|role| allowed.contains(&role))
    }

    /// The header object exactly as received, for forwarding to other services.
    pub fn to_json(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    user: Option<Identity>,
    cookies: Option<Map<String, Value>>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user(identity: Identity) -> Self {
        Self {
            user: Some(identity),
            cookies: None,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user = match json_object_header(headers, USER_HEADER)? {
            Some(object) => Some(parse_identity(object)?),
            None => None,
        };
        // Only the `user` header can fail a request.
        let cookies = json_object_header(headers, COOKIES_HEADER).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "ignoring unreadable cookies header");
            None
        });
        Ok(Self { user, cookies })
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn cookies(&self) -> Option<&Map<String, Value>> {
        self.cookies.as_ref()
    }
}

/// Parsed once per request; later extractions reuse the cached value.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(context.clone());
        }

        let context = RequestContext::from_headers(&parts.headers)?;
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

fn json_object_header(
    headers: &HeaderMap,
    name: &str,
) -> Result<Option<Map<String, Value>>, AppError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    let text = value
        .to_str()
        .map_err(|_| AppError::bad_request(format!("{name} header must be valid UTF-8")))?;

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) if object.is_empty() => Ok(None),
        Ok(Value::Object(object)) => Ok(Some(object)),
        Ok(Value::Null) => Ok(None),
        Ok(_) => Err(AppError::bad_request(format!(
            "{name} header must be a JSON object"
        ))),
        Err(err) => Err(AppError::bad_request(format!(
            "{name} header is not valid JSON: {err}"
        ))),
    }
}

fn parse_identity(object: Map<String, Value>) -> Result<Identity, AppError> {
    let header: UserHeader = serde_json::from_value(Value::Object(object.clone()))
        .map_err(|err| AppError::bad_request(format!("invalid user header: {err}")))?;

    let role = header.role.as_deref().and_then(|value| value.parse().ok());
    if role.is_none() {
        tracing::debug!(uid = %header.uid, role = ?header.role, "caller has no recognised role");
    }

    Ok(Identity {
        uid: header.uid,
        role,
        raw: object,
    })
}
