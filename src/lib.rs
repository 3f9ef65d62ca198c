//! A web service issuing one-time passcodes for account activation and password reset, delivered by
//! email.

pub mod api;
pub mod config;
pub mod email;
pub mod issuance;
pub mod notify;
pub mod otp;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use axum::{
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue, StatusCode},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::issuance::OtpIssuer;

/// The state shared by all request handlers. Immutable once the server starts.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Issues passcodes for incoming requests.
    pub issuer: Arc<OtpIssuer>,
}

impl AppState {
    /// Creates the state around an issuer.
    pub fn new(issuer: OtpIssuer) -> Self {
        Self {
            issuer: Arc::new(issuer),
        }
    }
}

/// Builds the application's router with its middleware.
///
/// Every response allows any origin, including errors from outside the OTP route.
pub fn app(state: AppState) -> Router {
    api::routes::router()
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Returns the canonical reason phrase of a status code (e.g. `Not Found`), falling back to the
/// numeric code for unknown statuses.
pub(crate) fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_owned(), str::to_owned)
}
