//! See [`ResendNotifier`].

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::{
    email::OutgoingEmail,
    notify::{Error, Notifier},
};

/// The default base URL of the Resend API.
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// A [`Notifier`] sending emails through the [Resend](https://resend.com) HTTP API.
#[derive(Clone, Debug)]
pub struct ResendNotifier {
    /// The HTTP client requests are sent with.
    client: reqwest::Client,

    /// The full URL of the send email endpoint.
    endpoint: String,

    /// The API key authorizing sends.
    api_key: SecretString,
}

impl ResendNotifier {
    /// Creates a notifier for the Resend API at `api_url`.
    pub fn new(client: reqwest::Client, api_url: &str, api_key: SecretString) -> Self {
        Self {
            client,
            endpoint: format!("{}/emails", api_url.trim_end_matches('/')),
            api_key,
        }
    }
}

/// A request body for Resend's send email endpoint.
#[derive(Serialize, Debug)]
struct SendEmailRequest<'a> {
    /// The sender, in `Name <address>` or bare address form.
    from: String,

    /// The recipients.
    to: Vec<String>,

    /// The subject line.
    subject: &'a str,

    /// The HTML body.
    html: &'a str,

    /// The plain text body.
    text: &'a str,
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let body = SendEmailRequest {
            from: email.from.to_string(),
            to: vec![email.to.email.to_string()],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rejected(status));
        }

        debug!(%status, "email accepted by Resend");

        Ok(())
    }
}
