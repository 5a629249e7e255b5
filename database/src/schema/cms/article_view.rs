use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use super::Article;
use crate::{
    schema::accounts::Profile,
    sqlx::{self, Row},
};

/// An article as rendered for one viewer. `favorited` and
/// `author.following` are relative to that viewer and are false for
/// anonymous requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    #[serde(serialize_with = "iso8601")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "iso8601")]
    pub updated_at: Option<DateTime<Utc>>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: Profile,
}

impl ArticleView {
    pub fn new(
        article: &Article,
        author: Profile,
        tag_list: Vec<String>,
        favorited: bool,
        favorites_count: i64,
    ) -> Self {
        Self {
            slug: article.slug.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            body: article.body.clone(),
            tag_list,
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited,
            favorites_count,
            author,
        }
    }

    pub async fn load<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
        article: &Article,
        viewer_id: Option<i64>,
        executor: E,
    ) -> sqlx::Result<Self> {
        let row = sqlx::query(
            r#"SELECT
                accounts.username,
                accounts.bio,
                accounts.image,
                EXISTS(
                    SELECT 1 FROM follows
                    WHERE follower_id = $2 AND followee_id = accounts.id
                ) AS following,
                EXISTS(
                    SELECT 1 FROM favorites
                    WHERE account_id = $2 AND article_id = articles.id
                ) AS favorited,
                (SELECT COUNT(*) FROM favorites WHERE article_id = articles.id) AS favorites_count,
                COALESCE(
                    (SELECT array_agg(tags.name ORDER BY article_tags.id)
                     FROM article_tags
                     INNER JOIN tags ON tags.id = article_tags.tag_id
                     WHERE article_tags.article_id = articles.id),
                    '{}'
                ) AS tag_list
               FROM articles
               INNER JOIN accounts ON accounts.id = articles.author_id
               WHERE articles.id = $1"#,
        )
        .bind(article.id)
        .bind(viewer_id)
        .fetch_one(executor)
        .await?;

        let author = Profile {
            username: row.try_get("username")?,
            bio: row.try_get("bio")?,
            image: row.try_get("image")?,
            following: row.try_get("following")?,
        };

        Ok(Self::new(
            article,
            author,
            row.try_get("tag_list")?,
            row.try_get("favorited")?,
            row.try_get("favorites_count")?,
        ))
    }
}

fn iso8601<S: Serializer>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(timestamp) => {
            serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
        }
        None => serializer.serialize_none(),
    }
}
