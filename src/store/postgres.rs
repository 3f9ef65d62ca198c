//! See [`PgStore`].

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

use crate::{
    otp::OtpRecord,
    store::{Error, OtpStore},
};

/// An [`OtpStore`] writing records straight into PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgStore {
    /// The SQLx database pool.
    pool: PgPool,
}

impl PgStore {
    /// Connects to the database and runs pending migrations, returning a store once complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial database connection or its migrations fail.
    pub async fn connect(db_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().connect(db_url).await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self::from_pool(pool))
    }

    /// Creates a store from an existing pool whose database is already migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets the underlying database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OtpStore for PgStore {
    async fn create(&self, record: &OtpRecord) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO otp_verification_codes (email, otp_code, purpose, expires_at, is_used)
                VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.email)
        .bind(record.otp_code.as_str())
        .bind(record.purpose.as_str())
        .bind(record.expires_at)
        .bind(record.is_used)
        .execute(&self.pool)
        .await?;

        debug!(purpose = %record.purpose, "stored OTP record");

        Ok(())
    }
}
