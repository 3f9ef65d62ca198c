//! Service configuration, read once from the environment at startup.

use lettre::message::Mailbox;
use secrecy::SecretString;
use thiserror::Error;

use crate::notify::resend::DEFAULT_API_URL;

/// The address listened on when `ADDRESS` isn't set.
const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";

/// The sender mailbox used when `FROM_MAILBOX` isn't set.
const DEFAULT_FROM_MAILBOX: &str = "onboarding@resend.dev";

/// The application name used when `APP_NAME` isn't set.
const DEFAULT_APP_NAME: &str = "Gold Nightmare App";

/// The complete service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The socket address to listen on.
    pub address: String,

    /// Where OTP records are written.
    pub storage: StorageConfig,

    /// How OTP emails are sent.
    pub mailer: MailerConfig,

    /// The mailbox OTP emails are sent from.
    pub from_mailbox: Mailbox,

    /// The application name shown in OTP emails.
    pub app_name: String,
}

/// The storage backend OTP records are written to.
#[derive(Clone, Debug)]
pub enum StorageConfig {
    /// A PostgreSQL database, connected to directly.
    Postgres {
        /// The database connection URL.
        url: SecretString,
    },

    /// A Supabase project's PostgREST API.
    Rest {
        /// The project's base URL.
        url: String,

        /// The service role key.
        service_key: SecretString,
    },
}

/// The provider OTP emails are sent through.
#[derive(Clone, Debug)]
pub enum MailerConfig {
    /// The Resend HTTP API.
    Resend {
        /// The API's base URL.
        api_url: String,

        /// The API key.
        api_key: SecretString,
    },

    /// An SMTP relay.
    Smtp {
        /// The relay's hostname.
        hostname: String,

        /// The SMTP username.
        username: String,

        /// The SMTP password.
        password: SecretString,
    },
}

/// An error reading the configuration.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// A variable needed by a partially configured backend isn't set.
    #[error("environment variable `{0}` should be set")]
    Missing(&'static str),

    /// A variable is set to a value that can't be used.
    #[error("environment variable `{name}` is invalid: {reason}")]
    Invalid {
        /// The variable's name.
        name: &'static str,

        /// Why the value can't be used.
        reason: String,
    },

    /// No storage backend is configured.
    #[error("no storage configured: set `DATABASE_URL`, or `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`")]
    NoStorage,

    /// No email provider is configured.
    #[error("no email provider configured: set `RESEND_API_KEY`, or `SMTP_HOSTNAME`, `SMTP_USERNAME`, and `SMTP_PASSWORD`")]
    NoMailer,
}

impl Config {
    /// Reads the configuration from the environment, after loading any `.env` file.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    /// Reads the configuration from variables looked up by name. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if no storage backend or email provider is configured, if a backend is only
    /// partially configured, or if `FROM_MAILBOX` isn't a valid mailbox.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let storage = if let Some(url) = var("DATABASE_URL") {
            StorageConfig::Postgres { url: url.into() }
        } else if let Some(url) = var("SUPABASE_URL") {
            StorageConfig::Rest {
                url,
                service_key: required("SUPABASE_SERVICE_ROLE_KEY")?.into(),
            }
        } else {
            return Err(ConfigError::NoStorage);
        };

        let mailer = if let Some(api_key) = var("RESEND_API_KEY") {
            MailerConfig::Resend {
                api_url: var("RESEND_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
                api_key: api_key.into(),
            }
        } else if let Some(hostname) = var("SMTP_HOSTNAME") {
            MailerConfig::Smtp {
                hostname,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?.into(),
            }
        } else {
            return Err(ConfigError::NoMailer);
        };

        let from_mailbox = var("FROM_MAILBOX")
            .as_deref()
            .unwrap_or(DEFAULT_FROM_MAILBOX)
            .parse()
            .map_err(|error: lettre::address::AddressError| ConfigError::Invalid {
                name: "FROM_MAILBOX",
                reason: error.to_string(),
            })?;

        Ok(Self {
            address: var("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into()),
            storage,
            mailer,
            from_mailbox,
            app_name: var("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.into()),
        })
    }
}
