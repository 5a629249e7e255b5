mod session_maximum_days;

pub use self::session_maximum_days::SessionMaximumDays;

use log::warn;
use once_cell::sync::OnceCell;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    env,
    sync::{Arc, RwLock},
};

pub trait Configuration {
    type Type: Serialize + DeserializeOwned;

    fn default() -> Option<Self::Type>;
    fn key() -> &'static str;

    /// `session-maximum-days` is read from `SESSION_MAXIMUM_DAYS`.
    fn environment_variable() -> String {
        Self::key().to_uppercase().replace('-', "_")
    }
}

static SHARED_MANAGER: OnceCell<ConfigurationManager> = OnceCell::new();

#[derive(Clone, Debug, Default)]
pub struct ConfigurationManager {
    active_configuration: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl ConfigurationManager {
    pub fn shared() -> Self {
        SHARED_MANAGER.get_or_init(Self::default).clone()
    }

    pub fn get<T: Configuration>(&self) -> Option<T::Type> {
        let configuration = self.active_configuration.read().ok()?;
        configuration
            .get(T::key())
            .and_then(|v| serde_json::value::from_value(v.clone()).ok())
            .or_else(T::default)
    }

    pub fn set<T: Configuration>(&self, value: T::Type) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        if let Ok(mut configuration) = self.active_configuration.write() {
            configuration.insert(T::key().to_owned(), value);
        }
        Ok(())
    }

    /// Overrides `T` from its environment variable when one is set. Values
    /// are parsed as JSON first and fall back to a plain string.
    pub fn load_environment<T: Configuration>(&self) {
        if let Ok(raw) = env::var(T::environment_variable()) {
            self.apply_raw::<T>(&raw);
        }
    }

    fn apply_raw<T: Configuration>(&self, raw: &str) {
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()));
        match serde_json::value::from_value::<T::Type>(value) {
            Ok(value) => {
                if let Err(err) = self.set::<T>(value) {
                    warn!("unable to store {}: {:?}", T::key(), err);
                }
            }
            Err(err) => warn!(
                "ignoring invalid value for {} ({}): {}",
                T::key(),
                T::environment_variable(),
                err
            ),
        }
    }
}
