use std::env;
use std::str::FromStr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    /// OpenWeather API key; synthetic weather is served when unset
    pub openweather_api_key: Option<String>,
    pub openweather_url: String,
    /// How long a cached weather row stays fresh
    pub weather_cache_ttl_hours: i64,
    /// Bearer session lifetime
    pub session_ttl_hours: i64,
    /// Secret for verifying scheduler webhooks (HMAC-SHA256); the webhook is off without it
    pub scheduler_secret: Option<String>,
    pub scheduler_enabled: bool,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            openweather_url: env::var("OPENWEATHER_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".to_string()),
            weather_cache_ttl_hours: parse_var("WEATHER_CACHE_TTL_HOURS", 6)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 168)?,
            scheduler_secret: env::var("SCHEDULER_SECRET").ok().filter(|s| !s.is_empty()),
            scheduler_enabled: parse_var("SCHEDULER_ENABLED", true)?,
            port: parse_var("PORT", 8080)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}
