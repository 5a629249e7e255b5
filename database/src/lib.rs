pub mod schema;
pub mod store;

pub use ::migrations::{initialize, migrations, run_all, sqlx};

#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("row not found")]
    RowNotFound,
    #[error("unique constraint violated")]
    Conflict,
    #[error("sql error: {0}")]
    Other(#[from] sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";

pub trait SqlxResultExt<T> {
    fn map_database_error(self) -> Result<T, DatabaseError>;
}

impl<T> SqlxResultExt<T> for Result<T, sqlx::Error> {
    fn map_database_error(self) -> Result<T, DatabaseError> {
        self.map_err(|error| match error {
            sqlx::Error::RowNotFound => DatabaseError::RowNotFound,
            sqlx::Error::Database(database_error)
                if database_error.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                DatabaseError::Conflict
            }
            other => DatabaseError::Other(other),
        })
    }
}
