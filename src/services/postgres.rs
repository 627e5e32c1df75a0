use crate::models::{DrawLogEntry, Gender, ProfileDraft, UserProfile};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// PostgreSQL client for the profile and draw-log tables.
///
/// Constructed once at startup and shared read-only behind an `Arc`; the
/// inner pool is safe for concurrent use. Both stores the service relies on
/// live here: `profiles` (point lookups and the candidate filter) and
/// `draw_logs` (append-only, newest-first reads for the cooldown gate).
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        Self::with_timeouts(database_url, max_connections, min_connections, 5, 600).await
    }

    async fn with_timeouts(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL with URL: {}", url);

        Self::with_timeouts(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }

    /// Insert a validated profile draft; the store assigns id and created_at.
    pub async fn insert_profile(&self, draft: &ProfileDraft) -> Result<Uuid, StoreError> {
        let query = r#"
            INSERT INTO profiles (nickname, age, gender, contact_handle)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(&draft.nickname)
            .bind(draft.age)
            .bind(draft.gender)
            .bind(&draft.contact_handle)
            .fetch_one(&self.pool)
            .await?;

        let id: Uuid = row.get("id");

        tracing::debug!("Inserted profile {} ({})", id, draft.gender);

        Ok(id)
    }

    /// Look up a profile by id
    pub async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let query = r#"
            SELECT id, nickname, age, gender, contact_handle, created_at
            FROM profiles
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(|row| UserProfile {
            id: row.get("id"),
            nickname: row.get("nickname"),
            age: row.get("age"),
            gender: row.get("gender"),
            contact_handle: row.get("contact_handle"),
            created_at: row.get("created_at"),
        }))
    }

    /// Fetch the requester's most recent draw-log entry, if any
    pub async fn last_draw(&self, user_id: Uuid) -> Result<Option<DrawLogEntry>, StoreError> {
        let query = r#"
            SELECT id, requesting_user_id, matched_user_id, requester_fingerprint, created_at
            FROM draw_logs
            WHERE requesting_user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| DrawLogEntry {
            id: row.get("id"),
            requesting_user_id: row.get("requesting_user_id"),
            matched_user_id: row.get("matched_user_id"),
            requester_fingerprint: row.get("requester_fingerprint"),
            created_at: row.get("created_at"),
        }))
    }

    /// Select one candidate of the target gender, excluding the requester.
    ///
    /// Takes the first row satisfying the filter. The store makes no
    /// ordering promise here, so the pick is arbitrary, not uniformly
    /// random among eligible profiles.
    pub async fn pick_candidate(
        &self,
        target: Gender,
        exclude: Uuid,
    ) -> Result<Option<UserProfile>, StoreError> {
        let query = r#"
            SELECT id, nickname, age, gender, contact_handle, created_at
            FROM profiles
            WHERE gender = $1 AND id <> $2
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(target)
            .bind(exclude)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| UserProfile {
            id: row.get("id"),
            nickname: row.get("nickname"),
            age: row.get("age"),
            gender: row.get("gender"),
            contact_handle: row.get("contact_handle"),
            created_at: row.get("created_at"),
        }))
    }

    /// Append a draw-log entry.
    ///
    /// Append-only: entries are never mutated or deleted by this service.
    pub async fn record_draw(
        &self,
        requesting_user_id: Uuid,
        matched_user_id: Uuid,
        fingerprint: Option<&str>,
    ) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO draw_logs (requesting_user_id, matched_user_id, requester_fingerprint)
            VALUES ($1, $2, $3)
        "#;

        sqlx::query(query)
            .bind(requesting_user_id)
            .bind(matched_user_id)
            .bind(fingerprint)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded draw: {} -> {}",
            requesting_user_id,
            matched_user_id
        );

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(nickname: &str, age: i16, gender: Gender) -> ProfileDraft {
        ProfileDraft {
            nickname: nickname.to_string(),
            age,
            gender,
            contact_handle: format!("wx_{}", nickname.to_lowercase()),
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_store_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresClient::new(&url, 2, 1)
            .await
            .expect("Failed to connect");

        let requester_id = store
            .insert_profile(&draft("Storetest-A", 25, Gender::Male))
            .await
            .unwrap();
        let candidate_id = store
            .insert_profile(&draft("Storetest-B", 24, Gender::Female))
            .await
            .unwrap();
        assert_ne!(requester_id, candidate_id);

        let requester = store.get_profile(requester_id).await.unwrap().unwrap();
        assert_eq!(requester.gender, Gender::Male);
        assert_eq!(requester.age, 25);

        let picked = store
            .pick_candidate(Gender::Female, requester_id)
            .await
            .unwrap()
            .expect("pool should not be empty");
        assert_eq!(picked.gender, Gender::Female);
        assert_ne!(picked.id, requester_id);

        assert!(store.last_draw(requester_id).await.unwrap().is_none());

        store
            .record_draw(requester_id, picked.id, Some("abc123"))
            .await
            .unwrap();

        let entry = store.last_draw(requester_id).await.unwrap().unwrap();
        assert_eq!(entry.requesting_user_id, requester_id);
        assert_eq!(entry.matched_user_id, picked.id);
        assert_eq!(entry.requester_fingerprint.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_duplicate_submissions_get_distinct_ids() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresClient::new(&url, 2, 1)
            .await
            .expect("Failed to connect");

        let d = draft("Storetest-Dup", 30, Gender::Female);
        let first = store.insert_profile(&d).await.unwrap();
        let second = store.insert_profile(&d).await.unwrap();

        assert_ne!(first, second);
    }
}
