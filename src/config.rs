use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use time::{macros::format_description, UtcOffset};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Where foods, logs, weights and planner documents live.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Postgres { database_url: String },
    Local { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub jwt: JwtConfig,
    /// Offset in which "today" is evaluated.
    pub utc_offset: UtcOffset,
    pub auto_resolve_today: bool,
}

impl AppConfig {
    /// `host_offset` must be read before any other thread exists; `time`
    /// refuses to query the local offset in a multi-threaded process.
    pub fn from_env(host_offset: UtcOffset) -> anyhow::Result<Self> {
        let storage = match std::env::var("DATABASE_URL") {
            Ok(database_url) if !database_url.is_empty() => StorageBackend::Postgres { database_url },
            _ => StorageBackend::Local {
                path: std::env::var("LOCAL_STORE_PATH")
                    .unwrap_or_else(|_| "fityo-storage-v3.json".into())
                    .into(),
            },
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fityo".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fityo-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let utc_offset = resolve_offset(std::env::var("APP_UTC_OFFSET").ok().as_deref(), host_offset)?;
        let auto_resolve_today = std::env::var("AUTO_RESOLVE_TODAY")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        Ok(Self {
            storage,
            jwt,
            utc_offset,
            auto_resolve_today,
        })
    }
}

/// Parses `+HH:MM` / `-HH:MM`.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw.trim(), format).with_context(|| format!("invalid APP_UTC_OFFSET {raw:?}"))
}

/// `APP_UTC_OFFSET` when set, the host offset otherwise.
pub fn resolve_offset(configured: Option<&str>, host_offset: UtcOffset) -> anyhow::Result<UtcOffset> {
    match configured.map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_offset(raw),
        _ => Ok(host_offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_parse() {
        assert_eq!(parse_offset("+02:00").unwrap(), UtcOffset::from_hms(2, 0, 0).unwrap());
        assert_eq!(parse_offset("-05:30").unwrap(), UtcOffset::from_hms(-5, -30, 0).unwrap());
        assert!(parse_offset("CET").is_err());
    }

    #[test]
    fn host_offset_applies_when_unset() {
        let host = UtcOffset::from_hms(9, 0, 0).unwrap();
        assert_eq!(resolve_offset(None, host).unwrap(), host);
        assert_eq!(resolve_offset(Some(""), host).unwrap(), host);
        assert_eq!(resolve_offset(Some("-03:00"), host).unwrap(), UtcOffset::from_hms(-3, 0, 0).unwrap());
        assert!(resolve_offset(Some("soon"), host).is_err());
    }
}
