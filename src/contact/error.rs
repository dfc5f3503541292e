//! Contact endpoint errors and their HTTP mapping.
//!
//! Every failure is answered with `{"error": "<message>"}`. The message is
//! the variant's `Display` text, which the contact page shows as-is.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::mail::MailError;
use super::verify::VerifyError;

#[derive(Debug, Error)]
pub enum ContactError {
    /// Body is not JSON, or not an object of strings. Answered like any
    /// other unexpected failure.
    #[error("Internal server error")]
    UnreadableBody,

    /// One of name, email, message or recaptchaToken is missing or empty
    #[error("Missing required fields")]
    MissingFields,

    /// The verification service could not be reached or answered garbage
    #[error("reCAPTCHA service unavailable")]
    VerifierUnavailable(#[source] VerifyError),

    /// The verification service rejected the token; carries its error codes
    #[error("reCAPTCHA verification failed: {0}")]
    Rejected(String),

    /// Token was valid but scored below the threshold
    #[error("reCAPTCHA verification failed: suspicious activity detected")]
    LowScore(f64),

    /// The notification email to the studio could not be sent
    #[error("Failed to send email")]
    Delivery(#[source] MailError),
}

impl ContactError {
    /// Map error variant to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContactError::UnreadableBody | ContactError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ContactError::MissingFields
            | ContactError::VerifierUnavailable(_)
            | ContactError::Rejected(_)
            | ContactError::LowScore(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
