use log::info;
use tokio::time::Duration;

use database::store::SharedStore;

use crate::{
    configuration::{ConfigurationManager, SessionMaximumDays},
    jobs::{Job, JobInstance},
};

struct SessionCleanup {
    store: SharedStore,
}

#[rocket::async_trait]
impl Job for SessionCleanup {
    fn name(&self) -> &'static str {
        "SessionCleanup"
    }

    fn period(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn execute(&mut self) -> anyhow::Result<()> {
        let max_idle = SessionMaximumDays::max_idle(&ConfigurationManager::shared());
        let sessions_expired = self.store.cleanup_sessions(max_idle).await?;

        info!("SessionCleanup expired {} sessions", sessions_expired);

        Ok(())
    }
}

pub(crate) fn job(store: SharedStore) -> JobInstance {
    SessionCleanup { store }.instance()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use database::schema::accounts::{Account, Session};
    use database::store::MemoryStore;

    use super::*;

    #[rocket::async_test]
    async fn removes_expired_sessions() {
        let store = Arc::new(MemoryStore::new());
        let account = store.insert_account(Account::new("jake"));
        let live = store.insert_session(Session::new(account.id, None));
        let expired = store.insert_session(Session::new(
            account.id,
            Some(Utc::now() - chrono::Duration::seconds(1)),
        ));

        let mut job = SessionCleanup {
            store: store.clone(),
        };
        job.execute().await.unwrap();

        assert!(store.session(live.id).is_some());
        assert!(store.session(expired.id).is_none());
    }
}
