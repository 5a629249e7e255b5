use std::sync::Arc;

use rocket::{http::Header, local::blocking::Client};

use database::{
    schema::{
        accounts::{Account, Session},
        cms::Article,
    },
    store::MemoryStore,
};

use crate::webserver::rocket_server;

pub const TEST_ACCOUNT_USERNAME: &str = "testuser";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub author: Account,
    pub author_session: Session,
    pub article: Article,
}

/// A store holding one author with a live session and one article they
/// wrote.
pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let (author, author_session) = create_account(&store, TEST_ACCOUNT_USERNAME);
    let article = create_article(&store, author.id, "How to train your dragon");

    Fixture {
        store,
        author,
        author_session,
        article,
    }
}

pub fn create_account(store: &MemoryStore, username: &str) -> (Account, Session) {
    let mut account = Account::new(username);
    account.bio = Some(format!("{} writes about dragons", username));
    let account = store.insert_account(account);
    let session = store.insert_session(Session::new(account.id, None));

    (account, session)
}

pub fn create_article(store: &MemoryStore, author_id: i64, title: &str) -> Article {
    store
        .insert_article(Article::new(
            author_id,
            title.to_owned(),
            format!("All about {}", title.to_lowercase()),
            format!("{} is a long story.", title),
        ))
        .expect("fixture article slugs are unique")
}

pub fn authorization(session: &Session) -> Header<'static> {
    Header::new("Authorization", format!("Token {}", session.id))
}

pub fn client(store: &Arc<MemoryStore>) -> Client {
    Client::tracked(rocket_server(store.clone())).expect("valid rocket instance")
}
