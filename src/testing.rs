//! In-memory collaborators for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    email::OutgoingEmail,
    notify::{self, Notifier},
    otp::OtpRecord,
    store::{self, OtpStore},
};

/// An [`OtpStore`] keeping records in memory, or rejecting every write with a fixed status.
#[derive(Default, Debug)]
pub(crate) struct RecordingStore {
    /// The records written so far.
    records: Mutex<Vec<OtpRecord>>,

    /// The status every write is rejected with, if any.
    reject_with: Option<StatusCode>,
}

impl RecordingStore {
    /// Creates a store rejecting every write with `status`.
    pub(crate) fn failing(status: StatusCode) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    /// Gets a copy of the records written so far.
    pub(crate) fn records(&self) -> Vec<OtpRecord> {
        self.records.lock().expect("lock shouldn't be poisoned").clone()
    }
}

#[async_trait]
impl OtpStore for RecordingStore {
    async fn create(&self, record: &OtpRecord) -> Result<(), store::Error> {
        if let Some(status) = self.reject_with {
            return Err(store::Error::Rejected(status));
        }

        self.records
            .lock()
            .expect("lock shouldn't be poisoned")
            .push(record.clone());

        Ok(())
    }
}

/// A [`Notifier`] keeping sent emails in memory, or rejecting every send with a fixed status.
#[derive(Default, Debug)]
pub(crate) struct RecordingNotifier {
    /// The emails sent so far.
    emails: Mutex<Vec<OutgoingEmail>>,

    /// The status every send is rejected with, if any.
    reject_with: Option<StatusCode>,
}

impl RecordingNotifier {
    /// Creates a notifier rejecting every send with `status`.
    pub(crate) fn failing(status: StatusCode) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    /// Gets a copy of the emails sent so far.
    pub(crate) fn emails(&self) -> Vec<OutgoingEmail> {
        self.emails.lock().expect("lock shouldn't be poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), notify::Error> {
        if let Some(status) = self.reject_with {
            return Err(notify::Error::Rejected(status));
        }

        self.emails
            .lock()
            .expect("lock shouldn't be poisoned")
            .push(email.clone());

        Ok(())
    }
}
