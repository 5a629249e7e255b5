use std::env;

use anyhow::{bail, Context};

use database::schema::accounts::{Account, Session};

/// Runs pending migrations. `database issue-session <username>` additionally
/// makes sure the account exists and prints a fresh session token for it.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = database::initialize(&database_url).await?;
    database::run_all(pool).await?;

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        None => {}
        Some("issue-session") => {
            let username = match args.next() {
                Some(username) => username,
                None => bail!("usage: database issue-session <username>"),
            };
            let mut account = match Account::find_by_username(&username, pool).await {
                Ok(account) => account,
                Err(database::sqlx::Error::RowNotFound) => Account::new(username),
                Err(other) => return Err(other.into()),
            };
            account.save(pool).await?;

            let session = Session::new(account.id, None);
            session.save(pool).await?;
            println!("Authorization: Token {}", session.id);
        }
        Some(other) => bail!("unknown command '{}'", other),
    }

    Ok(())
}
