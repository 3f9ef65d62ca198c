//! Persistence of issued one-time passcodes.

pub mod postgres;
pub mod rest;

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::{otp::OtpRecord, status_text};

pub use postgres::PgStore;
pub use rest::RestStore;

/// The name of the table (or PostgREST resource) OTP records are written to.
pub const OTP_TABLE: &str = "otp_verification_codes";

/// Somewhere OTP records can be written to.
///
/// Records are only ever created here. Reading and consuming them is left to the verification flow.
#[async_trait]
pub trait OtpStore: Send + Sync + Debug {
    /// Writes a new OTP record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record wasn't written.
    async fn create(&self, record: &OtpRecord) -> Result<(), Error>;
}

/// An error writing an OTP record.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The storage service answered with a non-success status.
    #[error("{}", status_text(*.0))]
    Rejected(StatusCode),

    /// The storage service couldn't be reached or its response couldn't be read.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The database query failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
