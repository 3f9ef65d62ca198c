//! All routes for the HTTP API.

use axum::{
    http::Method,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::{api, AppState};

pub mod v1 {
    //! The routes for version 1 of the HTTP API.

    pub mod send_otp_email;
}

/// The path of the OTP route, matching where the function is mounted on Supabase.
pub const SEND_OTP_EMAIL_PATH: &str = "/functions/v1/send-otp-email";

/// Builds the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            SEND_OTP_EMAIL_PATH,
            post(v1::send_otp_email::post)
                .options(v1::send_otp_email::options)
                .fallback(method_not_allowed),
        )
        .fallback(fallback)
}

/// Answers CORS preflights on any path, and rejects everything else as not found.
async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return v1::send_otp_email::options().await.into_response();
    }

    api::Error::RouteNotFound.into_response()
}

/// Rejects methods the OTP route doesn't handle with the usual failure body.
async fn method_not_allowed(method: Method) -> api::Error {
    api::Error::MethodNotAllowed(method)
}
