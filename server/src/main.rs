#[macro_use]
extern crate rocket;

use std::{env, sync::Arc};

use anyhow::Context;

use database::store::{PgStore, SharedStore};

use crate::configuration::{ConfigurationManager, SessionMaximumDays};

mod configuration;
mod jobs;
#[cfg(test)]
mod test_helpers;
mod webserver;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    ConfigurationManager::shared().load_environment::<SessionMaximumDays>();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = database::initialize(&database_url).await?;
    database::run_all(pool).await?;

    let store: SharedStore = Arc::new(PgStore::new(pool.clone()));
    tokio::spawn(jobs::run(store.clone()));

    webserver::main(store).await?;
    Ok(())
}
