use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use database::{
    schema::cms::{slugify, Article},
    store::Store,
};

use super::{Failure, ResultExt};

pub const TITLE: &str = "article.title";
pub const DESCRIPTION: &str = "article.description";
pub const BODY: &str = "article.body";
pub const SLUG: &str = "article.slug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    String,
    Unique,
}

impl Rule {
    fn message(self, field: &str) -> String {
        match self {
            Rule::Required => format!("The {} field is required.", field),
            Rule::String => format!("The {} must be a string.", field),
            Rule::Unique => format!("The {} has already been taken.", field),
        }
    }
}

/// Failed rules keyed by dotted field path, serialized as
/// `{ "errors": { "article.title": ["..."] } }`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, rule: Rule) {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(rule.message(field));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

/// The fields of an article update that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleEdit {
    pub title: String,
    pub description: String,
    pub body: String,
}

fn required_string<'a>(
    fields: Option<&'a Map<String, Value>>,
    key: &str,
) -> Result<&'a str, Rule> {
    match fields.and_then(|fields| fields.get(key)) {
        None | Some(Value::Null) => Err(Rule::Required),
        Some(Value::String(value)) if value.trim().is_empty() => Err(Rule::Required),
        Some(Value::String(value)) => Ok(value.trim()),
        Some(Value::Array(items)) if items.is_empty() => Err(Rule::Required),
        Some(Value::Object(map)) if map.is_empty() => Err(Rule::Required),
        Some(_) => Err(Rule::String),
    }
}

impl ArticleEdit {
    /// Validates an update payload for `article`, collecting every failed
    /// rule before reporting. The slug is derived from the submitted title
    /// and must not belong to any other article. A title of the wrong type
    /// skips the slug rules entirely.
    pub async fn validate(
        payload: &Value,
        article: &Article,
        store: &dyn Store,
    ) -> Result<Self, Failure> {
        let fields = payload.get("article").and_then(Value::as_object);
        let mut errors = ValidationErrors::default();

        let title = required_string(fields, "title");
        let description = required_string(fields, "description");
        let body = required_string(fields, "body");
        for (field, result) in [(TITLE, &title), (DESCRIPTION, &description), (BODY, &body)] {
            if let Err(rule) = result {
                errors.add(field, *rule);
            }
        }

        match fields.and_then(|fields| fields.get("title")) {
            None | Some(Value::Null) => errors.add(SLUG, Rule::Required),
            Some(Value::String(title)) => {
                let slug = slugify(title.trim());
                if slug.is_empty() {
                    errors.add(SLUG, Rule::Required);
                } else if store
                    .slug_in_use(&slug, article.id)
                    .await
                    .map_to_failure()?
                {
                    errors.add(SLUG, Rule::Unique);
                }
            }
            Some(_) => {}
        }

        match (title, description, body) {
            (Ok(title), Ok(description), Ok(body)) if errors.is_empty() => Ok(Self {
                title: title.to_owned(),
                description: description.to_owned(),
                body: body.to_owned(),
            }),
            _ => Err(Failure::invalid(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use database::{schema::accounts::Account, store::MemoryStore};
    use serde_json::json;

    use super::*;

    fn store_with_articles() -> (MemoryStore, Article, Article) {
        let store = MemoryStore::new();
        let author = store.insert_account(Account::new("jake"));
        let article = store
            .insert_article(Article::new(
                author.id,
                String::from("How to train your dragon"),
                String::from("Ever wonder how?"),
                String::from("You have to believe"),
            ))
            .unwrap();
        let other = store
            .insert_article(Article::new(
                author.id,
                String::from("Another article"),
                String::from("Something else"),
                String::from("Entirely"),
            ))
            .unwrap();
        (store, article, other)
    }

    async fn errors_for(payload: Value) -> Vec<String> {
        let (store, article, _) = store_with_articles();
        match ArticleEdit::validate(&payload, &article, &store).await {
            Ok(edit) => panic!("expected validation failure, got {:?}", edit),
            Err(Failure::Invalid(errors)) => errors.fields().map(String::from).collect(),
            Err(other) => panic!("unexpected failure {:?}", other),
        }
    }

    #[rocket::async_test]
    async fn accepts_a_complete_payload() {
        let (store, article, _) = store_with_articles();
        let payload = json!({
            "article": {
                "title": "Updated title",
                "slug": "overwrite-slug",
                "description": "New description.",
                "body": "Updated article body.",
            }
        });

        let edit = ArticleEdit::validate(&payload, &article, &store)
            .await
            .unwrap();
        assert_eq!(
            edit,
            ArticleEdit {
                title: String::from("Updated title"),
                description: String::from("New description."),
                body: String::from("Updated article body."),
            }
        );
    }

    #[rocket::async_test]
    async fn accepted_values_are_trimmed() {
        let (store, article, _) = store_with_articles();
        let payload = json!({
            "article": {
                "title": "  Updated title ",
                "description": "\tNew description.\n",
                "body": " Updated article body.",
            }
        });

        let edit = ArticleEdit::validate(&payload, &article, &store)
            .await
            .unwrap();
        assert_eq!(edit.title, "Updated title");
        assert_eq!(edit.description, "New description.");
        assert_eq!(edit.body, "Updated article body.");
    }

    #[rocket::async_test]
    async fn empty_payload_requires_everything() {
        assert_eq!(
            errors_for(json!({})).await,
            vec![BODY, DESCRIPTION, SLUG, TITLE]
        );
        assert_eq!(
            errors_for(Value::Null).await,
            vec![BODY, DESCRIPTION, SLUG, TITLE]
        );
        assert_eq!(
            errors_for(json!({ "article": "not an object" })).await,
            vec![BODY, DESCRIPTION, SLUG, TITLE]
        );
    }

    #[rocket::async_test]
    async fn wrong_types_fail_without_a_slug_error() {
        let errors = errors_for(json!({
            "article": { "title": 123, "description": [], "body": null }
        }))
        .await;
        assert_eq!(errors, vec![BODY, DESCRIPTION, TITLE]);
    }

    #[rocket::async_test]
    async fn blank_titles_have_no_slug() {
        let errors = errors_for(json!({
            "article": { "title": "   ", "description": "d", "body": "b" }
        }))
        .await;
        assert_eq!(errors, vec![SLUG, TITLE]);

        let errors = errors_for(json!({
            "article": { "title": "???", "description": "d", "body": "b" }
        }))
        .await;
        assert_eq!(errors, vec![SLUG]);
    }

    #[rocket::async_test]
    async fn slugs_of_other_articles_are_taken() {
        let errors = errors_for(json!({
            "article": { "title": "Another Article!", "description": "d", "body": "b" }
        }))
        .await;
        assert_eq!(errors, vec![SLUG]);
    }

    #[rocket::async_test]
    async fn keeping_the_same_title_is_not_a_collision() {
        let (store, article, _) = store_with_articles();
        let payload = json!({
            "article": {
                "title": article.title,
                "description": article.description,
                "body": article.body,
            }
        });

        assert!(ArticleEdit::validate(&payload, &article, &store)
            .await
            .is_ok());
    }

    #[test]
    fn messages_name_the_field() {
        let mut errors = ValidationErrors::default();
        errors.add(TITLE, Rule::Required);
        errors.add(BODY, Rule::String);
        errors.add(SLUG, Rule::Unique);

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({
                "errors": {
                    "article.body": ["The article.body must be a string."],
                    "article.slug": ["The article.slug has already been taken."],
                    "article.title": ["The article.title field is required."],
                }
            })
        );
    }
}
