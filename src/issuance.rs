//! Issuing one-time passcodes: validate the request, store a fresh code, and email it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use thiserror::Error;
use tracing::{field, info, instrument, warn, Span};

use crate::{
    api::validation::{OtpRequest, UserEmail, UserEmailError},
    email::{MessageTemplate, OtpMessage},
    notify::{self, Notifier},
    otp::OtpRecord,
    store::{self, OtpStore},
};

/// Issues one-time passcodes, writing each to an [`OtpStore`] and emailing it through a
/// [`Notifier`].
#[derive(Debug)]
pub struct OtpIssuer {
    /// Where issued records are written.
    store: Arc<dyn OtpStore>,

    /// How passcodes reach their recipients.
    notifier: Arc<dyn Notifier>,

    /// The mailbox passcode emails are sent from.
    from: Mailbox,

    /// The application name shown in passcode emails.
    app_name: String,
}

impl OtpIssuer {
    /// Creates an issuer from its collaborators.
    pub fn new(
        store: Arc<dyn OtpStore>,
        notifier: Arc<dyn Notifier>,
        from: Mailbox,
        app_name: String,
    ) -> Self {
        Self {
            store,
            notifier,
            from,
            app_name,
        }
    }

    /// Issues a passcode for the request's email and purpose.
    ///
    /// The record is written before the email is sent. If sending fails, the record is kept.
    ///
    /// # Errors
    ///
    /// Fails without side effects if the request is invalid, and otherwise fails at the first
    /// collaborator call that doesn't succeed. See [`Error`].
    #[instrument(skip_all, fields(purpose = field::Empty))]
    pub async fn issue(&self, request: OtpRequest) -> Result<Issued, Error> {
        let raw_email = request.email.unwrap_or_default();
        let recipient = raw_email.parse::<UserEmail>().map_err(|error| match error {
            UserEmailError::Empty => ValidationError::EmailRequired,
            _ => ValidationError::InvalidEmail,
        })?;

        let purpose = request.purpose.unwrap_or_default();
        Span::current().record("purpose", purpose.as_str());

        // The address is stored as submitted so the verification flow can look it up verbatim.
        let record = OtpRecord::issue(raw_email, purpose, Utc::now());

        self.store.create(&record).await.map_err(|error| {
            warn!(%error, "failed to store OTP record");
            Error::Persistence(error)
        })?;

        let email = OtpMessage::new(&self.app_name, record.otp_code.as_str(), purpose)
            .to(self.from.clone(), recipient.mailbox());

        self.notifier.send(&email).await.map_err(|error| {
            warn!(%error, "failed to send OTP email");
            Error::Delivery(error)
        })?;

        info!(expires_at = %record.expires_at, "issued OTP");

        Ok(Issued {
            expires_at: record.expires_at,
        })
    }
}

/// The outcome of a successfully issued passcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Issued {
    /// When the issued passcode expires.
    pub expires_at: DateTime<Utc>,
}

/// A request that can't be issued a passcode.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// The email was absent, `null`, or empty.
    #[error("Email is required")]
    EmailRequired,

    /// The email isn't a valid address.
    #[error("Invalid email address")]
    InvalidEmail,
}

/// An error issuing a passcode.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request was invalid. Nothing was stored or sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record couldn't be stored. Nothing was sent.
    #[error("Failed to store OTP: {0}")]
    Persistence(#[source] store::Error),

    /// The record was stored but the email couldn't be sent.
    #[error("Failed to send email: {0}")]
    Delivery(#[source] notify::Error),
}
