use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slugify;
use crate::{
    sqlx::{self, FromRow},
    DatabaseError, SqlxResultExt,
};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub author_id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(author_id: i64, title: String, description: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            author_id,
            slug: slugify(&title),
            title,
            description,
            body,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn is_authored_by(&self, account_id: i64) -> bool {
        self.author_id == account_id
    }

    /// Replaces the editable fields and re-derives the slug from the new
    /// title.
    pub fn apply_edit(&mut self, title: String, description: String, body: String) {
        self.slug = slugify(&title);
        self.title = title;
        self.description = description;
        self.body = body;
    }

    pub async fn find_by_slug<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        slug: &str,
        executor: E,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "SELECT id, author_id, slug, title, description, body, created_at, updated_at FROM articles WHERE slug = $1",
        )
        .bind(slug)
        .fetch_one(executor)
        .await
    }

    /// Whether any article other than `except_article_id` already uses `slug`.
    pub async fn slug_in_use<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        slug: &str,
        except_article_id: i64,
        executor: E,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM articles WHERE slug = $1 AND id <> $2)",
        )
        .bind(slug)
        .bind(except_article_id)
        .fetch_one(executor)
        .await
    }

    pub async fn save<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        &mut self,
        executor: E,
    ) -> Result<(), DatabaseError> {
        let updated_at = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            r#"UPDATE articles SET
                slug = $2,
                title = $3,
                description = $4,
                body = $5,
                updated_at = now()
               WHERE id = $1
               RETURNING updated_at"#,
        )
        .bind(self.id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.description)
        .bind(&self.body)
        .fetch_optional(executor)
        .await
        .map_database_error()?
        .ok_or(DatabaseError::RowNotFound)?;

        self.updated_at = updated_at;
        Ok(())
    }
}
