//! Gateway configuration from the environment

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// TCP port to bind, `PORT` (default 3000)
    pub port: u16,
    /// Postgres connection string, `DATABASE_URL`
    pub database_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", value))?,
            Err(_) => 3000,
        };
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        Ok(Self { port, database_url })
    }
}
