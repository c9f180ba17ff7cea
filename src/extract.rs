use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` body whose rejections render as a `bad_request` [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
