use once_cell::sync::OnceCell;
use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::PgPoolOptions,
    PgPool,
};

pub use sqlx;

static POOL: OnceCell<PgPool> = OnceCell::new();

// Reversible migrations: each `NNNN_name.up.sql` has a matching `.down.sql`.
static MIGRATOR: Migrator = sqlx::migrate!("./sql");

/// Connects the shared pool on first use. Later calls return the existing
/// pool and ignore `database_url`.
pub async fn initialize(database_url: &str) -> Result<&'static PgPool, sqlx::Error> {
    if let Some(pool) = POOL.get() {
        return Ok(pool);
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    Ok(POOL.get_or_init(|| pool))
}

pub fn migrations() -> &'static Migrator {
    &MIGRATOR
}

pub async fn run_all(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
