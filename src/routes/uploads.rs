use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::files::SignedUrlRequest;
use crate::identity::RequestContext;
use crate::permissions::{authorize, Operation};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SignedUrlQuery {
    #[serde(default)]
    pub static_file: bool,
    pub filename: Option<String>,
    pub max_size_mb: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
}

pub async fn signed_upload_url(
    State(state): State<AppState>,
    context: RequestContext,
    Query(details): Query<SignedUrlQuery>,
) -> AppResult<Json<SignedUrlResponse>> {
    let user = authorize(Operation::SignedUploadUrl, &context)?;

    let request = SignedUrlRequest {
        user: user.to_json(),
        static_file: details.static_file,
        filename: details
            .filename
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        max_size_mb: details
            .max_size_mb
            .unwrap_or(state.config.signed_url_max_size_mb),
    };

    let url = state.files.signed_url(&request).await?;
    tracing::debug!(uid = %user.uid, static_file = request.static_file, "issued signed upload url");
    Ok(Json(SignedUrlResponse { url }))
}
