//! Extractors whose rejections render like every other error of their surface.
//!
//! Axum's stock `Json` and `Path` reject with plain-text 4xx bodies. The API
//! wrappers turn those into `validation_error` JSON bodies; the page wrapper
//! answers a malformed task id with a 404, as an unknown route would.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::{AppError, PageError};

/// `axum::Json` for request bodies, rejecting with a 400 `validation_error`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` for the API, rejecting with a 400 `validation_error`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Path` for the HTML actions, rejecting with a 404 page.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PageError))]
pub struct PagePath<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for PageError {
    fn from(rejection: PathRejection) -> Self {
        PageError(AppError::UnknownPath(rejection.body_text()))
    }
}
