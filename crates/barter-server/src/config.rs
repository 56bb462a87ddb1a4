use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use barter_core::TransitionPolicy;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_days: i64,
    pub transitions: TransitionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("BARTER_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("BARTER_JWT_SECRET is unset or still a placeholder");
        }

        let host = get("BARTER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("BARTER_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("BARTER_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let db_path: PathBuf = get("BARTER_DB_PATH")
            .unwrap_or_else(|| "barter.db".into())
            .into();

        let token_days: i64 = get("BARTER_TOKEN_DAYS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("BARTER_TOKEN_DAYS must be a whole number")?;

        let transitions = match get("BARTER_TRANSITIONS") {
            Some(raw) => raw.parse::<TransitionPolicy>().map_err(anyhow::Error::msg)?,
            None => TransitionPolicy::default(),
        };

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
            token_days,
            transitions,
        })
    }
}
