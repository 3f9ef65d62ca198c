//! Utilities to help with API request validation.

use std::str::FromStr;

use derive_more::derive::{AsRef, Deref, Display};
use idna::uts46::{self, Uts46};
use lettre::{message::Mailbox, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::otp::Purpose;

/// A `POST` request body asking for a one-time passcode.
///
/// Fields are loosely typed so a missing or empty email is reported as a validation failure rather
/// than a deserialization failure.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
pub struct OtpRequest {
    /// The address to send the passcode to.
    #[serde(default)]
    pub email: Option<String>,

    /// Why the passcode is requested. Absent or `null` means [`Purpose::Activation`].
    #[serde(default)]
    pub purpose: Option<Purpose>,
}

/// A recipient email address. Ensures the address uses a domain name rather than an IP address, and
/// normalizes the domain name (for non-ASCII characters).
#[derive(
    Deref,
    AsRef,
    Display,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
)]
#[as_ref(forward)]
pub struct UserEmail(Address);

impl UserEmail {
    /// The maximum length of a [`UserEmail`].
    ///
    /// As per RFC 3696 erratum 1690, the theoretical maximum is 254.
    pub const MAX_LENGTH: usize = 254;

    /// Gets a reference to the email address string.
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Builds a [`Mailbox`] for this address with no display name.
    pub fn mailbox(&self) -> Mailbox {
        Mailbox::new(None, self.0.clone())
    }
}

/// An error constructing a [`UserEmail`].
#[derive(Error, Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum UserEmailError {
    /// The email address was empty.
    #[error("email address is empty")]
    Empty,

    /// The email address was invalid.
    #[error("invalid email address")]
    Invalid,

    /// The domain part was an IP address rather than a domain name.
    #[error("IP addresses not allowed in email address")]
    IpAddr,
}

impl FromStr for UserEmail {
    type Err = UserEmailError;

    fn from_str(str: &str) -> Result<Self, Self::Err> {
        if str.is_empty() {
            return Err(UserEmailError::Empty);
        }

        if str.len() > Self::MAX_LENGTH {
            return Err(UserEmailError::Invalid);
        }

        let Some((user, domain)) = str.rsplit_once('@') else {
            return Err(UserEmailError::Invalid);
        };

        if domain.starts_with('[') {
            return Err(UserEmailError::IpAddr);
        }

        let (domain, domain_result) = Uts46::new().to_user_interface(
            // These are the recommended arguments for this function.
            domain.as_bytes(),
            uts46::AsciiDenyList::URL,
            uts46::Hyphens::Allow,
            |_, _, _| true,
        );

        if domain_result.is_err() {
            return Err(UserEmailError::Invalid);
        }

        let Ok(address) = Address::new(user, domain.to_lowercase()) else {
            return Err(UserEmailError::Invalid);
        };

        Ok(Self(address))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn invalid_emails_rejected() {
        let invalid_emails = [
            "invalid",
            "a@b@example.com",
            "spaced user@example.com",
            "user@example-.com",
            "more-than-64-characters-in-the-local-part-is-toooooooooooooo-long@example.com",
        ];

        for email in invalid_emails {
            assert_eq!(
                email.parse::<UserEmail>(),
                Err(UserEmailError::Invalid),
                "{email} should be invalid"
            );
        }

        assert_eq!("".parse::<UserEmail>(), Err(UserEmailError::Empty));
        assert_eq!(
            "user@[10.0.0.1]".parse::<UserEmail>(),
            Err(UserEmailError::IpAddr)
        );
    }

    #[test]
    fn domain_normalized() -> anyhow::Result<()> {
        // The local part keeps its case because mail servers may treat it case-sensitively.
        for email in ["Gold@EXAMPLÉ.com", "Gold@xn--exampl-gva.COM"] {
            assert_eq!(email.parse::<UserEmail>()?.as_str(), "Gold@examplé.com");
        }

        Ok(())
    }

    #[test]
    fn request_fields_optional() -> anyhow::Result<()> {
        let empty: OtpRequest = serde_json::from_value(json!({}))?;
        assert_eq!(empty.email, None);
        assert_eq!(empty.purpose, None);

        let null_purpose: OtpRequest =
            serde_json::from_value(json!({ "email": "a@b.com", "purpose": null }))?;
        assert_eq!(null_purpose.email.as_deref(), Some("a@b.com"));
        assert_eq!(null_purpose.purpose, None);

        let reset: OtpRequest =
            serde_json::from_value(json!({ "email": "a@b.com", "purpose": "reset" }))?;
        assert_eq!(reset.purpose, Some(Purpose::Reset));

        Ok(())
    }

    #[test]
    fn unknown_purpose_rejected() {
        serde_json::from_value::<OtpRequest>(json!({ "email": "a@b.com", "purpose": "login" }))
            .expect_err("unknown purposes should be rejected");
    }
}
