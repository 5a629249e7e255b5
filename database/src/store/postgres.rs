use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use super::Store;
use crate::{
    schema::{
        accounts::{Account, Session},
        cms::{Article, ArticleView},
    },
    sqlx::PgPool,
    DatabaseError, SqlxResultExt,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn account_for_session(&self, session_id: Uuid) -> Result<Account, DatabaseError> {
        Account::find_by_session_id(session_id, &self.pool)
            .await
            .map_database_error()
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Article, DatabaseError> {
        Article::find_by_slug(slug, &self.pool)
            .await
            .map_database_error()
    }

    async fn slug_in_use(
        &self,
        slug: &str,
        except_article_id: i64,
    ) -> Result<bool, DatabaseError> {
        Article::slug_in_use(slug, except_article_id, &self.pool)
            .await
            .map_database_error()
    }

    async fn update_article(&self, mut article: Article) -> Result<Article, DatabaseError> {
        article.save(&self.pool).await?;
        Ok(article)
    }

    async fn article_view(
        &self,
        article: &Article,
        viewer_id: Option<i64>,
    ) -> Result<ArticleView, DatabaseError> {
        ArticleView::load(article, viewer_id, &self.pool)
            .await
            .map_database_error()
    }

    async fn cleanup_sessions(&self, max_idle: Duration) -> Result<u64, DatabaseError> {
        Session::cleanup(max_idle, &self.pool)
            .await
            .map_database_error()
    }
}
