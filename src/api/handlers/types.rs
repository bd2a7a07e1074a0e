//! Shared response envelope and API error taxonomy.
//!
//! Every endpoint answers with `{ "success": bool, "data"?: ..., "message"?: ... }`.
//! Errors map onto a fixed set of variants so handlers cannot invent ad-hoc
//! status codes: authentication problems are always 401 with a generic
//! message, authorization problems 403, and store failures 500 with the
//! detail kept in the server logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Response envelope shared by all endpoints.
#[derive(Serialize, ToSchema, Debug)]
pub struct Envelope<T = ()> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    #[must_use]
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl Envelope<()> {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error taxonomy for request handling.
///
/// `MissingToken`, `InvalidToken` and `InvalidCredentials` deliberately carry
/// fixed messages: the caller never learns whether a signature check, an
/// expiry check, or a principal lookup failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authorized to access this route")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Store(err) => {
                error!("store failure: {err:?}");
                if cfg!(debug_assertions) {
                    format!("Internal server error: {err:#}")
                } else {
                    "Internal server error".to_string()
                }
            }
            other => other.to_string(),
        };
        (self.status(), Envelope::fail(message)).into_response()
    }
}
