//! Body extractors whose rejections render as JSON errors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` answering malformed bodies with a 400 `{"error": ...}`
/// instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
