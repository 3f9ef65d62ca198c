//! The HTTP API, and the conversion of its errors into responses.

pub mod routes;
pub mod validation;

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::{Method, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::issuance;

/// A JSON extractor and response whose rejections become [`Error`]s, so malformed bodies get the
/// same failure response as every other error.
///
/// Bodies are parsed as JSON whatever their `Content-Type`, since browsers send `text/plain` for
/// string bodies posted without explicit headers.
#[derive(Clone, Debug)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state).await?;

        Ok(Self(serde_json::from_slice(&bytes)?))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> AxumResponse {
        axum::Json(self.0).into_response()
    }
}

/// The result of an API route handler.
pub type Response<T> = Result<(StatusCode, Json<T>), Error>;

/// An error handling an API request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The passcode couldn't be issued.
    #[error(transparent)]
    Issue(#[from] issuance::Error),

    /// The request body couldn't be read.
    #[error("Invalid request body: {}", .0.body_text())]
    UnreadableBody(#[from] BytesRejection),

    /// The request body isn't a valid JSON object of the expected shape.
    #[error("Invalid request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The OTP route doesn't accept the request's method.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(Method),

    /// No route matches the request.
    #[error("Not found")]
    RouteNotFound,
}

/// The broad category of an [`Error`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ErrorKind {
    /// The request was invalid.
    Validation,

    /// The OTP record couldn't be stored.
    Persistence,

    /// The OTP email couldn't be sent.
    Delivery,

    /// The request's path matched no route.
    Routing,
}

impl Error {
    /// Gets the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Issue(issuance::Error::Validation(_))
            | Self::UnreadableBody(_)
            | Self::MalformedBody(_)
            | Self::MethodNotAllowed(_) => ErrorKind::Validation,
            Self::Issue(issuance::Error::Persistence(_)) => ErrorKind::Persistence,
            Self::Issue(issuance::Error::Delivery(_)) => ErrorKind::Delivery,
            Self::RouteNotFound => ErrorKind::Routing,
        }
    }

    /// Gets the HTTP status this error responds with.
    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }
}

impl ErrorKind {
    /// Gets the HTTP status errors of this kind respond with.
    ///
    /// Clients of the OTP route only distinguish success from failure, so every failure of the
    /// route itself is a `500`.
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation | Self::Persistence | Self::Delivery => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Routing => StatusCode::NOT_FOUND,
        }
    }
}

/// The body of every failure response.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct FailureBody {
    /// Always `false`.
    pub success: bool,

    /// A message describing the failure.
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> AxumResponse {
        let kind = self.kind();
        let message = self.to_string();

        match kind {
            ErrorKind::Persistence | ErrorKind::Delivery => {
                error!(?kind, error = %message, "request failed");
            }
            ErrorKind::Validation | ErrorKind::Routing => {
                info!(?kind, error = %message, "request rejected");
            }
        }

        (
            kind.status(),
            Json(FailureBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
