use log::{info, warn};
use rocket::{
    serde::json::{self, Json},
    State,
};
use serde::Serialize;
use serde_json::Value;

use database::{
    schema::{
        accounts::Account,
        cms::{Article, ArticleView},
    },
    store::{SharedStore, Store},
    DatabaseError,
};

use super::{
    auth::AuthenticatedAccount,
    validation::{ArticleEdit, Rule, SLUG},
    Failure, ResultExt,
};

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Forbidden,
}

/// Only an article's author may change it.
pub fn authorize_update(account: &Account, article: &Article) -> Authorization {
    if article.is_authored_by(account.id) {
        Authorization::Authorized
    } else {
        Authorization::Forbidden
    }
}

#[get("/articles/<slug>")]
pub async fn get_article(
    slug: &str,
    viewer: Option<AuthenticatedAccount>,
    store: &State<SharedStore>,
) -> Result<Json<ArticleResponse>, Failure> {
    let article = store.find_article_by_slug(slug).await.map_to_failure()?;
    let viewer_id = viewer.map(|viewer| viewer.0.id);
    let article = store
        .article_view(&article, viewer_id)
        .await
        .map_to_failure()?;

    Ok(Json(ArticleResponse { article }))
}

#[put("/articles/<slug>", data = "<payload>")]
pub async fn update_article(
    slug: &str,
    account: AuthenticatedAccount,
    store: &State<SharedStore>,
    payload: Result<Json<Value>, json::Error<'_>>,
) -> Result<Json<ArticleResponse>, Failure> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(err) => {
            // Validated as an empty payload.
            warn!("unreadable article payload: {:?}", err);
            Value::Null
        }
    };

    let article = apply_update(store.inner().as_ref(), &account.0, slug, &payload).await?;
    Ok(Json(ArticleResponse { article }))
}

/// Runs an update for `account` against the article at `slug`. Lookup,
/// authorization and validation all happen before anything is written.
pub async fn apply_update(
    store: &dyn Store,
    account: &Account,
    slug: &str,
    payload: &Value,
) -> Result<ArticleView, Failure> {
    let mut article = store.find_article_by_slug(slug).await.map_to_failure()?;
    if authorize_update(account, &article) == Authorization::Forbidden {
        warn!(
            "{} attempted to update article {} owned by account {}",
            account.username, article.slug, article.author_id
        );
        return Err(Failure::forbidden());
    }

    let edit = ArticleEdit::validate(payload, &article, store).await?;
    article.apply_edit(edit.title, edit.description, edit.body);

    let article = match store.update_article(article).await {
        // Another article claimed the slug after validation ran.
        Err(DatabaseError::Conflict) => return Err(Failure::invalid_field(SLUG, Rule::Unique)),
        result => result.map_to_failure()?,
    };
    info!("{} updated article {}", account.username, article.slug);

    store
        .article_view(&article, Some(account.id))
        .await
        .map_to_failure()
}
