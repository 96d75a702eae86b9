use std::env;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::services::attendance::Requirement;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub default_requirement: Requirement,
    pub reminder_poll_secs: u64,
    pub notify_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://studydesk.db?mode=rwc".to_string());

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e| AppError::BadRequest(format!("BIND_ADDR is invalid: {}", e)))?;

        let default_requirement = match lookup("DEFAULT_REQUIREMENT") {
            Some(raw) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("DEFAULT_REQUIREMENT is not a number: {}", raw)))?;
                Requirement::new(value)?
            }
            None => Requirement::new(0.80)?,
        };

        let reminder_poll_secs = match lookup("REMINDER_POLL_SECS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::BadRequest(format!("REMINDER_POLL_SECS is not a number: {}", raw)))?,
            None => 30,
        };

        let notify_webhook_url = lookup("NOTIFY_WEBHOOK_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            default_requirement,
            reminder_poll_secs,
            notify_webhook_url,
        })
    }
}
