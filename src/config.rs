//! Environment-driven configuration.
//!
//! Loaded and validated once at startup; an invalid configuration is the
//! only error that exits the process non-zero. Values are read through an
//! injected lookup so tests can drive the parser without touching the
//! process environment.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::models::constants::{
    DEFAULT_CHECK_INTERVAL_MINUTES, DEFAULT_MAX_RETRIES, DEFAULT_MAX_UPTIME_HOURS,
    DEFAULT_RETRY_DELAY_SECONDS,
};
use crate::monitor::retry::RetryPolicy;
use crate::monitor::SchedulerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Profile whose reposts are monitored.
    pub username: String,
    pub check_interval: Duration,
    pub log_file: PathBuf,
    pub state_file: PathBuf,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub max_uptime: Duration,
    pub notifications_enabled: bool,
    pub telegram: Option<TelegramSettings>,
    pub desktop_notifications: bool,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup("TIKTOK_USERNAME")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TIKTOK_USERNAME"))?;

        let interval_minutes = parse_u64(
            &lookup,
            "CHECK_INTERVAL_MINUTES",
            DEFAULT_CHECK_INTERVAL_MINUTES,
        )?;
        if interval_minutes < 1 {
            return Err(ConfigError::Invalid {
                var: "CHECK_INTERVAL_MINUTES",
                reason: "must be at least 1 minute".to_string(),
            });
        }

        let max_retries = parse_u64(&lookup, "MAX_RETRIES", u64::from(DEFAULT_MAX_RETRIES))?;
        if max_retries < 1 {
            return Err(ConfigError::Invalid {
                var: "MAX_RETRIES",
                reason: "must be at least 1".to_string(),
            });
        }

        let retry_delay_secs =
            parse_u64(&lookup, "RETRY_DELAY_SECONDS", DEFAULT_RETRY_DELAY_SECONDS)?;
        if retry_delay_secs < 1 {
            return Err(ConfigError::Invalid {
                var: "RETRY_DELAY_SECONDS",
                reason: "must be at least 1 second".to_string(),
            });
        }

        let max_uptime_hours = parse_u64(&lookup, "MAX_UPTIME_HOURS", DEFAULT_MAX_UPTIME_HOURS)?;
        if max_uptime_hours < 1 {
            return Err(ConfigError::Invalid {
                var: "MAX_UPTIME_HOURS",
                reason: "must be at least 1 hour".to_string(),
            });
        }

        let notifications_enabled = parse_bool(&lookup, "ENABLE_NOTIFICATIONS", false);
        let telegram_enabled = parse_bool(&lookup, "TELEGRAM_NOTIFICATIONS", false);
        let desktop_notifications = parse_bool(&lookup, "DESKTOP_NOTIFICATIONS", false);

        let telegram = if telegram_enabled {
            let bot_token = lookup("TELEGRAM_BOT_TOKEN")
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
            let chat_id = lookup("TELEGRAM_CHAT_ID")
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))?;
            Some(TelegramSettings { bot_token, chat_id })
        } else {
            None
        };

        Ok(Self {
            username,
            check_interval: Duration::from_secs(interval_minutes * 60),
            log_file: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("reposts.log")),
            state_file: lookup("STATE_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("repost_state.json")),
            max_retries: max_retries as u32,
            retry_delay: Duration::from_secs(retry_delay_secs),
            max_uptime: Duration::from_secs(max_uptime_hours * 3600),
            notifications_enabled,
            telegram,
            desktop_notifications,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            retry_delay: self.retry_delay,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            check_interval: self.check_interval,
            max_uptime: self.max_uptime,
        }
    }

    /// Effective configuration for startup display, secrets masked.
    pub fn display_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("TIKTOK_USERNAME", self.username.clone()),
            (
                "CHECK_INTERVAL_MINUTES",
                (self.check_interval.as_secs() / 60).to_string(),
            ),
            ("LOG_FILE_PATH", self.log_file.display().to_string()),
            ("STATE_FILE_PATH", self.state_file.display().to_string()),
            ("MAX_RETRIES", self.max_retries.to_string()),
            ("RETRY_DELAY_SECONDS", self.retry_delay.as_secs().to_string()),
            (
                "MAX_UPTIME_HOURS",
                (self.max_uptime.as_secs() / 3600).to_string(),
            ),
            (
                "ENABLE_NOTIFICATIONS",
                self.notifications_enabled.to_string(),
            ),
            (
                "TELEGRAM_NOTIFICATIONS",
                self.telegram.is_some().to_string(),
            ),
            (
                "TELEGRAM_BOT_TOKEN",
                self.telegram
                    .as_ref()
                    .map(|_| "***".to_string())
                    .unwrap_or_else(|| "unset".to_string()),
            ),
            (
                "DESKTOP_NOTIFICATIONS",
                self.desktop_notifications.to_string(),
            ),
        ]
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
            var,
            reason: format!("expected an integer, got {raw:?}"),
        }),
    }
}

fn parse_bool<F>(lookup: &F, var: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
