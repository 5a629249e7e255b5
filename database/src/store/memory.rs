use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::Store;
use crate::{
    schema::{
        accounts::{Account, Session},
        cms::{Article, ArticleView},
    },
    DatabaseError,
};

/// An in-process store. Every operation runs under a single lock, so the
/// slug check and the write in `update_article` cannot interleave with
/// another update.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    accounts: BTreeMap<i64, Account>,
    sessions: HashMap<Uuid, Session>,
    articles: BTreeMap<i64, Article>,
    article_tags: HashMap<i64, Vec<String>>,
    // (account_id, article_id)
    favorites: HashSet<(i64, i64)>,
    // (follower_id, followee_id)
    follows: HashSet<(i64, i64)>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn slug_in_use(&self, slug: &str, except_article_id: i64) -> bool {
        self.articles
            .values()
            .any(|article| article.id != except_article_id && article.slug == slug)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_account(&self, mut account: Account) -> Account {
        let mut state = self.write();
        account.id = state.next_id();
        state.accounts.insert(account.id, account.clone());
        account
    }

    pub fn insert_session(&self, session: Session) -> Session {
        self.write().sessions.insert(session.id, session.clone());
        session
    }

    pub fn insert_article(&self, mut article: Article) -> Result<Article, DatabaseError> {
        let mut state = self.write();
        if !state.accounts.contains_key(&article.author_id) {
            return Err(DatabaseError::RowNotFound);
        }
        if state.slug_in_use(&article.slug, 0) {
            return Err(DatabaseError::Conflict);
        }

        article.id = state.next_id();
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    pub fn tag_article(&self, article_id: i64, tag: impl Into<String>) {
        let tag = tag.into();
        let mut state = self.write();
        let tags = state.article_tags.entry(article_id).or_default();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    pub fn favorite(&self, account_id: i64, article_id: i64) {
        self.write().favorites.insert((account_id, article_id));
    }

    pub fn follow(&self, follower_id: i64, followee_id: i64) {
        self.write().follows.insert((follower_id, followee_id));
    }

    pub fn article(&self, article_id: i64) -> Option<Article> {
        self.read().articles.get(&article_id).cloned()
    }

    pub fn session(&self, session_id: Uuid) -> Option<Session> {
        self.read().sessions.get(&session_id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn account_for_session(&self, session_id: Uuid) -> Result<Account, DatabaseError> {
        let now = Utc::now();
        let mut state = self.write();
        let account_id = match state.sessions.get_mut(&session_id) {
            Some(session) if session.is_live(now) => {
                session.last_accessed_at = now;
                session.account_id
            }
            _ => return Err(DatabaseError::RowNotFound),
        };

        state
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or(DatabaseError::RowNotFound)
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Article, DatabaseError> {
        self.read()
            .articles
            .values()
            .find(|article| article.slug == slug)
            .cloned()
            .ok_or(DatabaseError::RowNotFound)
    }

    async fn slug_in_use(
        &self,
        slug: &str,
        except_article_id: i64,
    ) -> Result<bool, DatabaseError> {
        Ok(self.read().slug_in_use(slug, except_article_id))
    }

    async fn update_article(&self, mut article: Article) -> Result<Article, DatabaseError> {
        let mut state = self.write();
        if !state.articles.contains_key(&article.id) {
            return Err(DatabaseError::RowNotFound);
        }
        if state.slug_in_use(&article.slug, article.id) {
            return Err(DatabaseError::Conflict);
        }

        article.updated_at = Some(Utc::now());
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn article_view(
        &self,
        article: &Article,
        viewer_id: Option<i64>,
    ) -> Result<ArticleView, DatabaseError> {
        let state = self.read();
        let author = state
            .accounts
            .get(&article.author_id)
            .ok_or(DatabaseError::RowNotFound)?;

        let following = viewer_id.map_or(false, |viewer_id| {
            state.follows.contains(&(viewer_id, author.id))
        });
        let favorited = viewer_id.map_or(false, |viewer_id| {
            state.favorites.contains(&(viewer_id, article.id))
        });
        let favorites_count = state
            .favorites
            .iter()
            .filter(|(_, article_id)| *article_id == article.id)
            .count() as i64;
        let tag_list = state
            .article_tags
            .get(&article.id)
            .cloned()
            .unwrap_or_default();

        Ok(ArticleView::new(
            article,
            author.profile(following),
            tag_list,
            favorited,
            favorites_count,
        ))
    }

    async fn cleanup_sessions(&self, max_idle: Duration) -> Result<u64, DatabaseError> {
        let now = Utc::now();
        let mut state = self.write();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|_, session| !session.is_stale(now, max_idle));
        Ok((before - state.sessions.len()) as u64)
    }
}
