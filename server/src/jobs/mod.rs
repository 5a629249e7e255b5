use std::time::{Duration, Instant};

use log::error;

use database::store::SharedStore;

mod session_cleanup;

#[rocket::async_trait]
trait Job: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn period(&self) -> Duration;
    async fn execute(&mut self) -> anyhow::Result<()>;

    fn instance(self) -> JobInstance
    where
        Self: Sized,
    {
        JobInstance::new(self)
    }
}

pub(crate) struct JobInstance {
    job: Box<dyn Job>,
    last_executed: Option<Instant>,
}

impl JobInstance {
    fn new<T: Job>(job: T) -> Self {
        Self {
            job: Box::new(job),
            last_executed: None,
        }
    }

    fn is_ready(&self, now: Instant) -> bool {
        match self.last_executed {
            Some(_) => self.next_execution() <= now,
            None => true,
        }
    }

    fn next_execution(&self) -> Instant {
        match self.last_executed {
            Some(last_executed) => last_executed + self.job.period(),
            None => Instant::now(),
        }
    }
}

/// Runs the periodic jobs until the process exits. A failing job is logged
/// and retried on its next period.
pub async fn run(store: SharedStore) {
    let mut jobs = vec![session_cleanup::job(store)];

    loop {
        let now = Instant::now();
        for instance in jobs.iter_mut().filter(|i| i.is_ready(now)) {
            if let Err(err) = instance.job.execute().await {
                error!("{} failed: {:?}", instance.job.name(), err);
            }
            instance.last_executed = Some(now);
        }

        let next_job = match jobs.iter().map(JobInstance::next_execution).min() {
            Some(next_job) => next_job,
            None => return,
        };
        tokio::time::sleep_until(next_job.into()).await;
    }
}
