use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sqlx::{self, FromRow};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The public face of an account, as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            bio: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    pub fn profile(&self, following: bool) -> Profile {
        Profile {
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
            following,
        }
    }

    pub async fn find_by_username<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        username: &str,
        executor: E,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "SELECT id, username, bio, image, created_at FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_one(executor)
        .await
    }

    /// Resolves a live session to its account, refreshing the session's
    /// last access time.
    pub async fn find_by_session_id<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        session_id: Uuid,
        executor: E,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"WITH touched AS (
                UPDATE sessions SET last_accessed_at = now()
                WHERE id = $1 AND (expires_at IS NULL OR expires_at > now())
                RETURNING account_id
               )
               SELECT accounts.id, accounts.username, accounts.bio, accounts.image, accounts.created_at
               FROM accounts
               INNER JOIN touched ON touched.account_id = accounts.id"#,
        )
        .bind(session_id)
        .fetch_one(executor)
        .await
    }

    pub async fn save<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        &mut self,
        executor: E,
    ) -> sqlx::Result<()> {
        let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"INSERT INTO accounts (username, bio, image) VALUES ($1, $2, $3)
               ON CONFLICT (username) DO UPDATE SET bio = $2, image = $3
               RETURNING id, created_at"#,
        )
        .bind(&self.username)
        .bind(self.bio.as_ref())
        .bind(self.image.as_ref())
        .fetch_one(executor)
        .await?;

        self.id = id;
        self.created_at = created_at;
        Ok(())
    }
}
