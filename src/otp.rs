//! The one-time passcode data model and its generation.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use derive_more::derive::{AsRef, Deref};
use rand::distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize, Serializer};

/// The smallest value an [`OtpCode`] can have. Codes never start with a zero.
const OTP_CODE_MIN: u32 = 100_000;

/// The largest value an [`OtpCode`] can have.
const OTP_CODE_MAX: u32 = 999_999;

/// How many minutes an OTP stays valid after it's issued.
pub const OTP_VALIDITY_MINUTES: i64 = 5;

/// How long an OTP stays valid after it's issued.
pub const OTP_LIFETIME: TimeDelta = TimeDelta::minutes(OTP_VALIDITY_MINUTES);

/// A 6-digit numeric one-time passcode.
#[derive(Deref, AsRef, Serialize, Clone, PartialEq, Eq, Hash, Debug)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generates a cryptographically secure pseudorandom code, uniformly distributed over
    /// `100000..=999999`.
    pub fn generate() -> Self {
        let value = Uniform::new_inclusive(OTP_CODE_MIN, OTP_CODE_MAX)
            .expect("OTP code range should be nonempty and finite")
            .sample(&mut rand::rng());

        Self(value.to_string())
    }

    /// Gets a reference to the code's digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an OTP was issued. Selects the notification template.
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Activating a newly registered account.
    #[default]
    Activation,

    /// Resetting a forgotten password.
    Reset,
}

impl Purpose {
    /// Gets the name the purpose is stored and serialized as.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Reset => "reset",
        }
    }

    /// Returns whether this is [`Purpose::Activation`].
    pub fn is_activation(self) -> bool {
        self == Self::Activation
    }
}

impl Display for Purpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored one-time passcode, as written to the OTP table.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct OtpRecord {
    /// The recipient's email address.
    pub email: String,

    /// The passcode sent to the recipient.
    pub otp_code: OtpCode,

    /// Why the passcode was issued.
    pub purpose: Purpose,

    /// When the passcode stops being valid.
    #[serde(serialize_with = "serialize_timestamp")]
    pub expires_at: DateTime<Utc>,

    /// Whether the passcode was consumed. Always `false` when issued; consumption happens elsewhere.
    pub is_used: bool,
}

impl OtpRecord {
    /// Creates an unused record for a freshly generated code expiring [`OTP_LIFETIME`] after `now`.
    pub fn issue(email: String, purpose: Purpose, now: DateTime<Utc>) -> Self {
        Self {
            email,
            otp_code: OtpCode::generate(),
            purpose,
            expires_at: expiry_from(now),
            is_used: false,
        }
    }
}

/// Returns when an OTP issued at `now` expires, truncated to milliseconds so it survives a round
/// trip through its ISO 8601 representation unchanged.
pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    (now + OTP_LIFETIME).trunc_subsecs(3)
}

/// Formats a timestamp as ISO 8601 in UTC with millisecond precision, e.g.
/// `2026-10-16T12:05:00.000Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Serializes a timestamp in the format of [`format_timestamp`].
///
/// # Errors
///
/// Fails if the serializer fails to serialize a string.
pub fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}
