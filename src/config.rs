use std::net::SocketAddr;

use anyhow::Context;

/// Token lifetime when `JWT_TTL_MINUTES` is unset: 90 days.
pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 90;
/// Upper bound on the token lifetime: 10 years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "carebook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "carebook-api".into()),
            ttl_minutes: ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };
        if jwt.secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            Err(_) => 8080,
        };
        Ok(Self {
            database_url,
            host,
            port,
            jwt,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn ttl_minutes(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TTL_MINUTES);
    };
    let minutes = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("JWT_TTL_MINUTES must be a whole number of minutes, got {raw:?}"))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_when_unset() {
        assert_eq!(ttl_minutes(None).unwrap(), DEFAULT_TTL_MINUTES);
        assert_eq!(ttl_minutes(Some(" 15 ")).unwrap(), 15);
    }

    #[test]
    fn ttl_out_of_range_is_rejected() {
        for raw in ["0", "-5", "abc", "9223372036854775807", "5256001"] {
            assert!(ttl_minutes(Some(raw)).is_err(), "{raw} accepted");
        }
        assert_eq!(ttl_minutes(Some("5256000")).unwrap(), MAX_TTL_MINUTES);
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let cfg = AppConfig {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 9000,
            jwt: JwtConfig {
                secret: "s".into(),
                issuer: "i".into(),
                audience: "a".into(),
                ttl_minutes: MAX_TTL_MINUTES,
            },
        };
        assert_eq!(cfg.bind_addr().unwrap().port(), 9000);
    }
}
