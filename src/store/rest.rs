//! See [`RestStore`].

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{
    otp::OtpRecord,
    store::{Error, OtpStore, OTP_TABLE},
};

/// An [`OtpStore`] writing records through a PostgREST endpoint, as exposed by Supabase under
/// `/rest/v1/`.
#[derive(Clone, Debug)]
pub struct RestStore {
    /// The HTTP client requests are sent with.
    client: reqwest::Client,

    /// The full URL of the OTP table's resource.
    endpoint: String,

    /// The service role key authorizing writes.
    service_key: SecretString,
}

impl RestStore {
    /// Creates a store writing to the OTP table of the project at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str, service_key: SecretString) -> Self {
        Self {
            client,
            endpoint: format!("{}/rest/v1/{OTP_TABLE}", base_url.trim_end_matches('/')),
            service_key,
        }
    }
}

#[async_trait]
impl OtpStore for RestStore {
    async fn create(&self, record: &OtpRecord) -> Result<(), Error> {
        let key = self.service_key.expose_secret();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .header("apikey", key)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rejected(status));
        }

        debug!(%status, purpose = %record.purpose, "stored OTP record");

        Ok(())
    }
}
