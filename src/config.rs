use std::net::IpAddr;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub token_ttl_days: i64,
    pub log_retention_days: i64,
    pub trusted_proxies: Vec<IpNet>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("FLEETLEDGER_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FLEETLEDGER_HOST: {e}"))?;

        let port: u16 = env_or("FLEETLEDGER_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid FLEETLEDGER_PORT: {e}"))?;

        let token_ttl_days: i64 = env_or("FLEETLEDGER_TOKEN_TTL_DAYS", "30")
            .parse()
            .map_err(|e| format!("Invalid FLEETLEDGER_TOKEN_TTL_DAYS: {e}"))?;

        let log_retention_days: i64 = env_or("FLEETLEDGER_LOG_RETENTION_DAYS", "90")
            .parse()
            .map_err(|e| format!("Invalid FLEETLEDGER_LOG_RETENTION_DAYS: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("FLEETLEDGER_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid FLEETLEDGER_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env_or("FLEETLEDGER_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            token_ttl_days,
            log_retention_days,
            trusted_proxies,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
