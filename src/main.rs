//! The OTP email service's web server.

use std::sync::Arc;

use secrecy::ExposeSecret;
use send_otp_email::{
    config::{Config, MailerConfig, StorageConfig},
    issuance::OtpIssuer,
    notify::{Notifier, ResendNotifier, SmtpNotifier},
    store::{OtpStore, PgStore, RestStore},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// # Errors
///
/// See implementation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,send_otp_email=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config).await?;

    info!(address = %config.address, "listening");

    let listener = TcpListener::bind(&config.address).await?;

    info!("ready");

    axum::serve(listener, send_otp_email::app(state)).await?;

    Ok(())
}

/// Connects the configured collaborators and wires them into the application state.
async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let client = reqwest::Client::new();

    let store: Arc<dyn OtpStore> = match &config.storage {
        StorageConfig::Postgres { url } => {
            info!("connecting to database and running migrations");
            Arc::new(PgStore::connect(url.expose_secret()).await?)
        }
        StorageConfig::Rest { url, service_key } => {
            info!(%url, "storing passcodes through PostgREST");
            Arc::new(RestStore::new(client.clone(), url, service_key.clone()))
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.mailer {
        MailerConfig::Resend { api_url, api_key } => {
            info!(%api_url, "sending email through Resend");
            Arc::new(ResendNotifier::new(client, api_url, api_key.clone()))
        }
        MailerConfig::Smtp {
            hostname,
            username,
            password,
        } => {
            info!(%hostname, "sending email through SMTP relay");
            Arc::new(SmtpNotifier::relay(hostname, username, password)?)
        }
    };

    Ok(AppState::new(OtpIssuer::new(
        store,
        notifier,
        config.from_mailbox.clone(),
        config.app_name.clone(),
    )))
}
