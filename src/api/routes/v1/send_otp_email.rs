//! Issuing a one-time passcode and emailing it to its recipient.

use axum::{
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderName, StatusCode,
    },
};
use axum_macros::debug_handler;
use serde::Serialize;

use crate::{
    api::{validation::OtpRequest, Json, Response},
    otp::format_timestamp,
    AppState,
};

/// The message of every successful response.
const SUCCESS_MESSAGE: &str = "تم إرسال رمز التفعيل بنجاح";

/// The headers answering a CORS preflight. These must stay this permissive.
const PREFLIGHT_HEADERS: [(HeaderName, &str); 3] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "*"),
];

/// Generates a passcode for the requested email and purpose, stores it, and emails it.
///
/// # Errors
///
/// See [`crate::api::Error`].
#[debug_handler(state = AppState)]
pub async fn post(
    State(state): State<AppState>,
    Json(body): Json<OtpRequest>,
) -> Response<PostResponse> {
    let issued = state.issuer.issue(body).await?;

    Ok((
        StatusCode::OK,
        Json(PostResponse {
            success: true,
            message: SUCCESS_MESSAGE.into(),
            expires_at: format_timestamp(&issued.expires_at),
        }),
    ))
}

/// A `POST` response body for this API route.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct PostResponse {
    /// Always `true`.
    pub success: bool,

    /// A human-readable confirmation.
    pub message: String,

    /// When the sent passcode expires, in ISO 8601 format.
    pub expires_at: String,
}

/// Answers a CORS preflight without touching any collaborator.
#[debug_handler]
pub async fn options() -> ([(HeaderName, &'static str); 3], &'static str) {
    (PREFLIGHT_HEADERS, "ok")
}
