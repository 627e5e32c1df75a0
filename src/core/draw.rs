use crate::models::MatchedProfile;
use crate::services::{PostgresClient, StoreError};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Minimum interval between two draws by the same requester.
pub const DEFAULT_COOLDOWN_SECS: i64 = 30;

/// Structured failure of a draw attempt
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("requesting user does not exist")]
    UserNotFound,

    #[error("last draw was {elapsed_secs}s ago, cooldown is {cooldown_secs}s")]
    RateLimited {
        elapsed_secs: i64,
        cooldown_secs: i64,
    },

    #[error("no opposite-gender profile available")]
    EmptyPool,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Draw decision procedure.
///
/// Gates a draw request through identity and cooldown checks, then selects
/// one opposite-gender candidate and appends a draw-log entry.
///
/// # Pipeline
/// 1. Identity check (`UserNotFound`)
/// 2. Cooldown check against the newest draw-log entry (`RateLimited`)
/// 3. Candidate selection from the opposite-gender pool (`EmptyPool`)
/// 4. Detached log write, then return the matched profile
#[derive(Clone)]
pub struct DrawEngine {
    store: Arc<PostgresClient>,
    cooldown: Duration,
}

impl DrawEngine {
    pub fn new(store: Arc<PostgresClient>, cooldown_secs: i64) -> Self {
        Self {
            store,
            cooldown: Duration::seconds(cooldown_secs),
        }
    }

    /// Run one draw for `user_id`.
    ///
    /// The cooldown gate is best-effort: it reads the newest log entry and
    /// the log write happens after the response is decided, so two requests
    /// from the same user racing inside the window can both pass. The log
    /// write itself is detached; its failure is logged and never turns a
    /// found match into an error.
    pub async fn draw(
        &self,
        user_id: Uuid,
        fingerprint: Option<String>,
    ) -> Result<MatchedProfile, DrawError> {
        let requester = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(DrawError::UserNotFound)?;

        if let Some(last) = self.store.last_draw(user_id).await? {
            check_cooldown(last.created_at, Utc::now(), self.cooldown)?;
        }

        let target = requester.gender.opposite();

        let candidate = self
            .store
            .pick_candidate(target, user_id)
            .await?
            .ok_or(DrawError::EmptyPool)?;

        tracing::info!(
            "Matched {} ({}) with a {} candidate",
            user_id,
            requester.gender,
            target
        );

        let store = Arc::clone(&self.store);
        let matched_id = candidate.id;
        tokio::spawn(async move {
            if let Err(e) = store
                .record_draw(user_id, matched_id, fingerprint.as_deref())
                .await
            {
                tracing::warn!("Failed to record draw log for {}: {}", user_id, e);
            }
        });

        Ok(MatchedProfile::from(candidate))
    }
}

/// Pure cooldown gate.
///
/// Fails while strictly less than `cooldown` has elapsed since the last
/// draw; passes at exactly the boundary and beyond.
pub fn check_cooldown(
    last_draw_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<(), DrawError> {
    let elapsed = now.signed_duration_since(last_draw_at);
    if elapsed < cooldown {
        return Err(DrawError::RateLimited {
            elapsed_secs: elapsed.num_seconds(),
            cooldown_secs: cooldown.num_seconds(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooldown() -> Duration {
        Duration::seconds(DEFAULT_COOLDOWN_SECS)
    }

    #[test]
    fn test_cooldown_blocks_within_window() {
        let now = Utc::now();
        let last = now - Duration::seconds(29);

        let err = check_cooldown(last, now, cooldown()).unwrap_err();
        match err {
            DrawError::RateLimited { elapsed_secs, cooldown_secs } => {
                assert_eq!(elapsed_secs, 29);
                assert_eq!(cooldown_secs, 30);
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[test]
    fn test_cooldown_passes_at_exact_boundary() {
        let now = Utc::now();
        let last = now - Duration::seconds(30);

        assert!(check_cooldown(last, now, cooldown()).is_ok());
    }

    #[test]
    fn test_cooldown_passes_after_window() {
        let now = Utc::now();
        let last = now - Duration::seconds(31);

        assert!(check_cooldown(last, now, cooldown()).is_ok());
    }

    #[test]
    fn test_cooldown_blocks_immediate_retry() {
        let now = Utc::now();

        assert!(check_cooldown(now, now, cooldown()).is_err());
    }
}
