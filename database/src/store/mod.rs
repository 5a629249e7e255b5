//! The persistence seam the web layer talks to. `PgStore` is the production
//! backend; `MemoryStore` keeps everything in process and is what the
//! server's tests run against.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::{
    schema::{
        accounts::Account,
        cms::{Article, ArticleView},
    },
    DatabaseError,
};

mod memory;
mod postgres;

pub use self::{memory::MemoryStore, postgres::PgStore};

pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Returns `RowNotFound` for unknown and expired sessions alike.
    async fn account_for_session(&self, session_id: Uuid) -> Result<Account, DatabaseError>;

    async fn find_article_by_slug(&self, slug: &str) -> Result<Article, DatabaseError>;

    async fn slug_in_use(&self, slug: &str, except_article_id: i64)
        -> Result<bool, DatabaseError>;

    /// Persists the editable fields and slug of an existing article and
    /// returns it with its refreshed `updated_at`. A slug already taken by
    /// another article yields `Conflict`.
    async fn update_article(&self, article: Article) -> Result<Article, DatabaseError>;

    async fn article_view(
        &self,
        article: &Article,
        viewer_id: Option<i64>,
    ) -> Result<ArticleView, DatabaseError>;

    async fn cleanup_sessions(&self, max_idle: Duration) -> Result<u64, DatabaseError>;
}
