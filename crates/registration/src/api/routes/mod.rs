mod registration;
mod system;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use serde_json::json;

use crate::domain::Error;

pub use registration::*;
pub use system::*;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::RegistrationClosed => (StatusCode::CONFLICT, self.to_string()),
            Error::PriceUnavailable { .. } => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            // Administrators fix these in the CMS, so the message names the field
            Error::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Error::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("failed to fetch registration configuration"),
            ),
        };
        let body = Json(json!({
            "error": error_message,
        }));
        (status, body).into_response()
    }
}
