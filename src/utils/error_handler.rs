use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::GenericResponse;

#[derive(Debug)]
pub enum AppError {
    BadRequestErr(String),
    NotFound(String),
    Auth(String),
    AlreadyExists(String),
    NotActive(String),
    Expired(String),
    AnyError(anyhow::Error),
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self::AnyError(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequestErr(msg) => {
                tracing::debug!("Bad request: {}", msg);
                error_response(StatusCode::BAD_REQUEST, msg)
            }
            Self::NotFound(msg) => {
                tracing::debug!("Not Found: {}", msg);
                error_response(StatusCode::NOT_FOUND, msg)
            }
            Self::Auth(msg) => {
                tracing::debug!("Unauthorized: {}", msg);
                error_response(StatusCode::UNAUTHORIZED, msg)
            }
            Self::AlreadyExists(msg) => {
                tracing::debug!("Already exists: {}", msg);
                error_response(StatusCode::BAD_REQUEST, msg)
            }
            Self::NotActive(msg) => {
                tracing::debug!("Otp code not active: {}", msg);
                error_response(StatusCode::GONE, msg)
            }
            Self::Expired(msg) => {
                tracing::debug!("Otp code expired: {}", msg);
                error_response(StatusCode::GONE, msg)
            }
            Self::AnyError(err) => {
                let msg = format!("Something went wrong: {err}");
                tracing::debug!("{msg}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let response = GenericResponse {
        success: false,
        message,
    };
    (status, Json(response)).into_response()
}
