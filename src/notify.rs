//! Delivery of rendered emails to their recipients.

pub mod resend;
pub mod smtp;

use std::{error::Error as StdError, fmt::Debug};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::{email::OutgoingEmail, status_text};

pub use resend::ResendNotifier;
pub use smtp::SmtpNotifier;

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Sends the email. Succeeds once the provider accepts it; delivery isn't confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider didn't accept the email.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error>;
}

/// An error sending an email.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The email API answered with a non-success status.
    #[error("{}", status_text(*.0))]
    Rejected(StatusCode),

    /// The email API couldn't be reached or its response couldn't be read.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The email couldn't be assembled into a valid message.
    #[error(transparent)]
    Message(#[from] lettre::error::Error),

    /// The mail transport failed to send the message.
    #[error(transparent)]
    Transport(Box<dyn StdError + Send + Sync>),
}
