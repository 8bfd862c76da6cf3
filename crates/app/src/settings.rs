//! Settings for the application, read from `settings.toml`:
//!
//! ```toml
//! [app]
//! level = "info"
//! timezone = "Europe/Moscow"
//!
//! [store.google]
//! spreadsheet_id = "..."
//! token = "..."
//!
//! [telegram]
//! token = "..."
//! allowed_users = [123456789]
//!
//! [reminders]
//! daily_hour = 21
//! weekly_hour = 11
//! ```
//!
//! A top-level `store = "memory"` line selects the in-memory store
//! instead of the Google one.

use chrono_tz::Tz;
use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    pub timezone: Tz,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Memory,
    Google(Google),
}

#[derive(Debug, Deserialize)]
pub struct Google {
    pub spreadsheet_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub allowed_users: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
pub struct Reminders {
    pub daily_hour: u32,
    pub weekly_hour: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub store: Store,
    pub telegram: Option<Telegram>,
    pub reminders: Option<Reminders>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
