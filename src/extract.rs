//! Request extractors whose rejections render as [`AppError`] JSON instead
//! of axum's plain-text defaults.

use crate::errors::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// A JSON request body; `axum::Json` with JSON error bodies for malformed payloads.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// `axum::extract::Path` with JSON error bodies for malformed ids.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
