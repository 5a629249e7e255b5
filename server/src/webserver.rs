use log::error;
use rocket::{
    http::Status,
    response::{self, status::Custom, Responder},
    serde::json::Json,
    Build, Request, Rocket,
};
use serde::Serialize;

use database::{store::SharedStore, DatabaseError};

use self::validation::{Rule, ValidationErrors};

mod articles;
mod auth;
mod validation;

pub fn rocket_server(store: SharedStore) -> Rocket<Build> {
    rocket::build()
        .manage(store)
        .mount(
            "/api/v1",
            routes![articles::get_article, articles::update_article],
        )
        .register("/", catchers![json_catcher])
}

pub async fn main(store: SharedStore) -> Result<(), rocket::Error> {
    rocket_server(store).launch().await?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

fn status_message(status: Status) -> &'static str {
    match status.code {
        401 => "Unauthenticated.",
        403 => "This action is unauthorized.",
        404 => "Not found.",
        422 => "The given data was invalid.",
        500 => "Server error.",
        _ => status.reason().unwrap_or("Error."),
    }
}

/// Every error status leaves the API as `{ "message": ... }` rather than
/// Rocket's HTML error page.
#[catch(default)]
fn json_catcher(status: Status, _request: &Request<'_>) -> Custom<Json<Message>> {
    Custom(
        status,
        Json(Message {
            message: status_message(status),
        }),
    )
}

trait ResultExt<T> {
    fn map_to_failure(self) -> Result<T, Failure>;
}

impl<T> ResultExt<T> for Result<T, DatabaseError> {
    fn map_to_failure(self) -> Result<T, Failure> {
        self.map_err(|err| match err {
            DatabaseError::RowNotFound => Failure::not_found(),
            other_error => {
                error!("unexpected database error: {:?}", other_error);
                Failure::Status(Status::InternalServerError)
            }
        })
    }
}

#[derive(Debug)]
pub enum Failure {
    Status(Status),
    Invalid(Json<ValidationErrors>),
}

impl<'r> Responder<'r, 'static> for Failure {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        match self {
            // Handed on to the JSON catcher.
            Failure::Status(status) => Err(status),
            Failure::Invalid(errors) => (Status::UnprocessableEntity, errors).respond_to(request),
        }
    }
}

impl Failure {
    pub fn not_found() -> Self {
        Self::Status(Status::NotFound)
    }

    pub fn forbidden() -> Self {
        Self::Status(Status::Forbidden)
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self::Invalid(Json(errors))
    }

    pub fn invalid_field(field: &str, rule: Rule) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, rule);
        Self::invalid(errors)
    }
}
