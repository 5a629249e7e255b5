use log::error;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use uuid::Uuid;

use database::{schema::accounts::Account, store::SharedStore, DatabaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Parses `Token <uuid>` or `Bearer <uuid>`.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let (scheme, token) = header.trim().split_once(' ')?;
        if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
            token.trim().parse().ok().map(SessionId)
        } else {
            None
        }
    }

    fn from_request_parts(request: &Request<'_>) -> Option<Self> {
        request
            .headers()
            .get_one("Authorization")
            .and_then(Self::from_authorization)
            .or_else(|| {
                request
                    .cookies()
                    .get("session_id")
                    .and_then(|cookie| cookie.value().parse().ok())
                    .map(SessionId)
            })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error("no session token was presented")]
    Missing,
    #[error("session is unknown or expired")]
    InvalidSession,
    #[error("no store is being managed")]
    StoreUnavailable,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// The account behind a live session. Routes that take this guard answer
/// 401 when the request carries no valid session; take
/// `Option<AuthenticatedAccount>` to allow anonymous access.
#[derive(Debug)]
pub struct AuthenticatedAccount(pub Account);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedAccount {
    type Error = AuthenticationError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session_id = match SessionId::from_request_parts(request) {
            Some(session_id) => session_id,
            None => return Outcome::Error((Status::Unauthorized, AuthenticationError::Missing)),
        };
        let store = match request.rocket().state::<SharedStore>() {
            Some(store) => store,
            None => {
                error!("no store is being managed by this rocket instance");
                return Outcome::Error((
                    Status::InternalServerError,
                    AuthenticationError::StoreUnavailable,
                ));
            }
        };

        match store.account_for_session(session_id.0).await {
            Ok(account) => Outcome::Success(AuthenticatedAccount(account)),
            Err(DatabaseError::RowNotFound) => Outcome::Error((
                Status::Unauthorized,
                AuthenticationError::InvalidSession,
            )),
            Err(other) => {
                error!("error validating session: {:?}", other);
                Outcome::Error((Status::InternalServerError, other.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SessionId;
    use uuid::Uuid;

    #[test]
    fn token_and_bearer_schemes() {
        let id = Uuid::new_v4();
        assert_eq!(
            SessionId::from_authorization(&format!("Token {}", id)),
            Some(SessionId(id))
        );
        assert_eq!(
            SessionId::from_authorization(&format!("bearer  {} ", id)),
            Some(SessionId(id))
        );
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        let id = Uuid::new_v4();
        assert_eq!(SessionId::from_authorization(&format!("Basic {}", id)), None);
        assert_eq!(SessionId::from_authorization("Token not-a-uuid"), None);
        assert_eq!(SessionId::from_authorization(&id.to_string()), None);
    }
}
