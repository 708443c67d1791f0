use rocket::serde::json::Json;
use rocket::Responder;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// JSON body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Responder, Debug)]
pub enum ApiError {
    #[response(status = 400)]
    BadRequest(Json<ErrorDetail>),
    #[response(status = 404)]
    NotFound(Json<ErrorDetail>),
    #[response(status = 500)]
    InternalError(Json<ErrorDetail>),
}

impl ApiError {
    pub fn bad_request(message: &str, errors: Vec<String>) -> Self {
        ApiError::BadRequest(Json(ErrorDetail {
            message: message.to_string(),
            errors,
        }))
    }

    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(Json(ErrorDetail {
            message: message.to_string(),
            errors: Vec::new(),
        }))
    }

    /// Logs the cause and hides it from the client.
    pub fn internal(message: &str, cause: impl Display) -> Self {
        log::error!("{}: {}", message, cause);
        ApiError::InternalError(Json(ErrorDetail {
            message: message.to_string(),
            errors: Vec::new(),
        }))
    }
}
