use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono_tz::Tz;
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_clock_per_min: u32,

    /// Zone shift start/end times are written in.
    pub company_timezone: Tz,
    pub location_timeout: Duration,
    /// Radius given to office locations created without one.
    pub default_fence_radius_m: f64,

    pub log_dir: String,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        let timezone: String = parse_or(&lookup, "COMPANY_TIMEZONE", "UTC".to_string())?;
        let company_timezone = timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("COMPANY_TIMEZONE: {e}"))?;

        let default_fence_radius_m = parse_or(&lookup, "DEFAULT_FENCE_RADIUS_M", 50.0)?;
        if !(default_fence_radius_m > 0.0) {
            return Err(anyhow!("DEFAULT_FENCE_RADIUS_M must be positive"));
        }

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            rate_clock_per_min: parse_or(&lookup, "RATE_CLOCK_PER_MIN", 30)?,

            company_timezone,
            location_timeout: Duration::from_secs(parse_or(&lookup, "LOCATION_TIMEOUT_SECS", 10)?),
            default_fence_radius_m,

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
