use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://…` or `memory://`
    pub url: String,
    pub pool_size: u32,
    pub connect_timeout_secs: u64,
    pub run_migrations: bool,
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Reads the process environment. `DATABASE_URL` is mandatory; its
    /// absence is reported as `MissingEnv` so startup can abort.
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 8000)?,
            environment: var_or("ENVIRONMENT", "development"),
            rust_log: var_or("RUST_LOG", "info"),
        };

        let url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(Error::MissingEnv("DATABASE_URL"))?;

        // Smaller pool and automatic migrations outside production
        let production = app.is_production();
        let database = DatabaseConfig {
            url,
            pool_size: parse_var("DB_POOL_SIZE", if production { 10 } else { 5 })?,
            connect_timeout_secs: parse_var("DB_CONNECT_TIMEOUT_SECS", 5)?,
            run_migrations: parse_var("DB_RUN_MIGRATIONS", !production)?,
        };

        Ok(Config { app, database })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The environment is process-wide; serialize tests that mutate it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear() {
        for name in [
            "DATABASE_URL",
            "PORT",
            "ENVIRONMENT",
            "DB_POOL_SIZE",
            "DB_CONNECT_TIMEOUT_SECS",
            "DB_RUN_MIGRATIONS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, Error::MissingEnv("DATABASE_URL")));
    }

    #[test]
    fn defaults_follow_environment() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("DATABASE_URL", "memory://");
        let dev = Config::from_env().unwrap();
        assert_eq!(dev.database.pool_size, 5);
        assert!(dev.database.run_migrations);
        assert_eq!(dev.app.port, 8000);

        env::set_var("ENVIRONMENT", "production");
        let prod = Config::from_env().unwrap();
        assert_eq!(prod.database.pool_size, 10);
        assert!(!prod.database.run_migrations);
        clear();
    }

    #[test]
    fn malformed_number_is_reported() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("DATABASE_URL", "memory://");
        env::set_var("PORT", "eighty");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { name: "PORT", .. }));
        clear();
    }
}
