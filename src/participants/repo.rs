use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{instrument, warn};

use super::repo_types::{NewParticipant, Participant};
use crate::config::StoreConfig;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("participant store not initialized")]
    NotInitialized,
    #[error("participant not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn insert(&self, entry: &NewParticipant) -> Result<(), StoreError>;
    /// All rows, most recent first.
    async fn list_all(&self) -> Result<Vec<Participant>, StoreError>;
    /// Exact, case-sensitive match on `serial_number`.
    async fn get_by_serial(&self, serial: &str) -> Result<Participant, StoreError>;
}

/// Store used when no credentials are configured.
/// Writes succeed without doing anything; reads fail with `NotInitialized`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewStore;

#[async_trait]
impl ParticipantStore for PreviewStore {
    async fn insert(&self, entry: &NewParticipant) -> Result<(), StoreError> {
        tracing::debug!(serial = %entry.serial_number, "preview mode, insert skipped");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        Err(StoreError::NotInitialized)
    }

    async fn get_by_serial(&self, _serial: &str) -> Result<Participant, StoreError> {
        Err(StoreError::NotInitialized)
    }
}

#[derive(Clone)]
pub struct PgParticipantStore {
    db: PgPool,
}

impl PgParticipantStore {
    /// Builds the pool without connecting; the first query opens a connection.
    pub fn connect_lazy(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(&config.url)?.password(&config.key);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy_with(options);
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl ParticipantStore for PgParticipantStore {
    #[instrument(skip(self, entry), fields(serial = %entry.serial_number))]
    async fn insert(&self, entry: &NewParticipant) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO participants (serial_number, name, email, phone, kick_username, comments)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.serial_number)
        .bind(&entry.name)
        .bind(&entry.email)
        .bind(&entry.phone)
        .bind(&entry.kick_username)
        .bind(&entry.comments)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, serial_number, name, email, phone, kick_username, comments,
                   created_at, updated_at
              FROM participants
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn get_by_serial(&self, serial: &str) -> Result<Participant, StoreError> {
        let mut rows = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, serial_number, name, email, phone, kick_username, comments,
                   created_at, updated_at
              FROM participants
             WHERE serial_number = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 2
            "#,
        )
        .bind(serial)
        .fetch_all(&self.db)
        .await?;

        if rows.len() > 1 {
            warn!(%serial, "serial number shared by several participants; returning newest");
        }
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }
}

/// Builds the store once at startup; `None` yields preview mode.
/// Migrations run against a configured store, and a failure there is not fatal.
pub async fn init_store(config: Option<&StoreConfig>) -> anyhow::Result<Arc<dyn ParticipantStore>> {
    let Some(cfg) = config else {
        warn!(
            "STORE_URL / STORE_KEY missing, running in preview mode: \
             entries are not persisted and admin/lookup views are unavailable"
        );
        return Ok(Arc::new(PreviewStore));
    };

    let store = PgParticipantStore::connect_lazy(cfg)?;
    if let Err(e) = sqlx::migrate!("./migrations").run(store.pool()).await {
        warn!(error = %e, "migration failed; continuing");
    }
    Ok(Arc::new(store))
}

#[cfg(test)]
mod repo_tests {
    use super::*;

    fn entry() -> NewParticipant {
        NewParticipant {
            serial_number: "GW-000001-0001".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            kick_username: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn preview_store_insert_is_noop_success() {
        assert!(PreviewStore.insert(&entry()).await.is_ok());
    }

    #[tokio::test]
    async fn preview_store_reads_are_not_initialized() {
        assert!(matches!(
            PreviewStore.list_all().await,
            Err(StoreError::NotInitialized)
        ));
        assert!(matches!(
            PreviewStore.get_by_serial("GW-000001-0001").await,
            Err(StoreError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn pg_store_builds_lazily_from_config() {
        let cfg = StoreConfig {
            url: "postgres://giveaway@localhost:5432/giveaway".into(),
            key: "secret".into(),
        };
        assert!(PgParticipantStore::connect_lazy(&cfg).is_ok());
    }

    #[test]
    fn pg_store_rejects_malformed_url() {
        let cfg = StoreConfig {
            url: "not a url".into(),
            key: "secret".into(),
        };
        assert!(matches!(
            PgParticipantStore::connect_lazy(&cfg),
            Err(StoreError::Database(_))
        ));
    }
}
