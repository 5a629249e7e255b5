use chrono::Duration;
use log::warn;

use super::{Configuration, ConfigurationManager};

const DEFAULT_DAYS: i64 = 7;
const MAXIMUM_DAYS: i64 = 3650;

/// Sessions unused for longer than this are removed by the cleanup job.
pub struct SessionMaximumDays;

impl SessionMaximumDays {
    /// Clamped to between one day and ten years.
    pub fn max_idle(manager: &ConfigurationManager) -> Duration {
        let days = manager.get::<Self>().unwrap_or(DEFAULT_DAYS);
        if days > MAXIMUM_DAYS {
            warn!(
                "{} of {} days is too long, using {}",
                Self::key(),
                days,
                MAXIMUM_DAYS
            );
        }
        Duration::days(days.clamp(1, MAXIMUM_DAYS))
    }
}

impl Configuration for SessionMaximumDays {
    type Type = i64;

    fn default() -> Option<Self::Type> {
        Some(DEFAULT_DAYS)
    }

    fn key() -> &'static str {
        "session-maximum-days"
    }
}
