//! See [`SmtpNotifier`].

use std::{error::Error as StdError, fmt::Debug};

use async_trait::async_trait;
use lettre::{
    message::MultiPart, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{
    email::OutgoingEmail,
    notify::{Error, Notifier},
};

/// A [`Notifier`] sending multipart emails through a lettre transport, an SMTP relay by default.
#[derive(Clone, Debug)]
pub struct SmtpNotifier<T = AsyncSmtpTransport<Tokio1Executor>> {
    /// The transport messages are sent through.
    transport: T,
}

impl SmtpNotifier {
    /// Creates a notifier sending through the SMTP relay at `hostname` over implicit TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay's TLS parameters can't be built for `hostname`.
    pub fn relay(
        hostname: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(hostname)?
            .credentials(Credentials::new(
                username.to_owned(),
                password.expose_secret().to_owned(),
            ))
            .build();

        Ok(Self::new(transport))
    }
}

impl<T> SmtpNotifier<T> {
    /// Creates a notifier sending through `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Gets the transport messages are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Builds a multipart plain text and HTML message from an [`OutgoingEmail`].
///
/// # Errors
///
/// Returns an error if the message headers are invalid.
pub fn to_message(email: &OutgoingEmail) -> Result<Message, lettre::error::Error> {
    Message::builder()
        .from(email.from.clone())
        .to(email.to.clone())
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
}

#[async_trait]
impl<T> Notifier for SmtpNotifier<T>
where
    T: AsyncTransport + Debug + Send + Sync,
    T::Error: StdError + Send + Sync + 'static,
{
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let message = to_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|error| Error::Transport(Box::new(error)))?;

        debug!("email accepted by SMTP relay");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lettre::transport::stub::AsyncStubTransport;

    use super::*;

    fn email() -> anyhow::Result<OutgoingEmail> {
        Ok(OutgoingEmail {
            from: "Gold Nightmare <onboarding@resend.dev>".parse()?,
            to: "a@b.com".parse()?,
            subject: "Your code".into(),
            html: "<p>123456</p>".into(),
            text: "123456".into(),
        })
    }

    #[tokio::test]
    async fn sends_multipart_message() -> anyhow::Result<()> {
        let notifier = SmtpNotifier::new(AsyncStubTransport::new_ok());

        notifier.send(&email()?).await?;

        let messages = notifier.transport().messages().await;
        assert_eq!(messages.len(), 1, "exactly one message should be sent");

        let recipient: lettre::Address = "a@b.com".parse()?;
        let (envelope, raw) = &messages[0];
        assert_eq!(envelope.to(), [recipient]);
        assert!(raw.contains("Subject: Your code"), "raw message: {raw}");
        assert!(raw.contains("multipart/alternative"), "raw message: {raw}");
        assert!(raw.contains("<p>123456</p>"), "raw message: {raw}");

        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_is_reported() -> anyhow::Result<()> {
        let notifier = SmtpNotifier::new(AsyncStubTransport::new_error());

        let error = notifier
            .send(&email()?)
            .await
            .expect_err("failing transport should fail the send");

        assert!(matches!(error, Error::Transport(_)), "unexpected error: {error:?}");
        assert_eq!(error.to_string(), "stub error");
        Ok(())
    }

    #[tokio::test]
    async fn usable_as_shared_notifier() -> anyhow::Result<()> {
        let stub = SmtpNotifier::new(AsyncStubTransport::new_ok());
        let notifier: Arc<dyn Notifier> = Arc::new(stub.clone());

        notifier.send(&email()?).await?;

        assert_eq!(stub.transport().messages().await.len(), 1);
        assert!(
            format!("{notifier:?}").starts_with("SmtpNotifier"),
            "unexpected debug output: {notifier:?}"
        );
        Ok(())
    }
}
