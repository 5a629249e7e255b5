use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::sqlx::{self, FromRow};

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(account_id: i64, expires_at: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            created_at: now,
            last_accessed_at: now,
            expires_at,
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }

    /// A session is stale once it has expired or has sat unused for longer
    /// than `max_idle`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        !self.is_live(now)
            || idle_cutoff(now, max_idle).map_or(false, |cutoff| self.last_accessed_at < cutoff)
    }

    pub async fn save<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        &self,
        executor: E,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, account_id, created_at, last_accessed_at, expires_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(self.id)
        .bind(self.account_id)
        .bind(self.created_at)
        .bind(self.last_accessed_at)
        .bind(self.expires_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn cleanup<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        max_idle: Duration,
        executor: E,
    ) -> sqlx::Result<u64> {
        let idle_cutoff = idle_cutoff(Utc::now(), max_idle);
        let result = sqlx::query(
            "DELETE FROM sessions WHERE (expires_at IS NOT NULL AND expires_at < NOW()) OR last_accessed_at < $1",
        )
        .bind(idle_cutoff)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Sessions last accessed before the returned instant are idle. `None` when
/// the window reaches past the earliest representable time.
fn idle_cutoff(now: DateTime<Utc>, max_idle: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(max_idle)
}
