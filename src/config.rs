use std::{env, fmt::Display, path::Path};

use crate::error::LoadError;

/// Load `path` into the process environment, or `.env` if no path is given.
/// A missing `.env` is fine, a missing explicit file is not.  Variables
/// already set are kept.
pub fn load_env(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path),
        None => {
            let _ = dotenvy::dotenv();
            Ok(())
        }
    }
}

/// Connection parameters for the data warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: String,
}

impl DbConfig {
    /// Read the `DW_*` variables from the process environment.  Call after
    /// the `.env` file has been loaded.
    pub fn from_env() -> DbConfig {
        DbConfig::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DbConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        DbConfig {
            dbname: lookup("DW_DATABASE_NAME"),
            user: lookup("DW_POSTGRES_USER"),
            password: lookup("DW_POSTGRES_PASSWORD"),
            host: lookup("DW_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: lookup("DW_PORT").unwrap_or_else(|| "5432".to_string()),
        }
    }

    /// Unset name, user or password are left for the driver to reject when
    /// it connects.
    pub fn pg_config(&self) -> Result<tokio_postgres::Config, LoadError> {
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .map_err(|e| LoadError::Config(format!("DW_PORT '{}': {}", self.port, e)))?;
        let mut config = tokio_postgres::Config::new();
        config.host(&self.host).port(port);
        if let Some(dbname) = &self.dbname {
            config.dbname(dbname);
        }
        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        Ok(config)
    }
}

impl Display for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "postgresql://{}:***@{}:{}/{}",
            self.user.as_deref().unwrap_or(""),
            self.host,
            self.port,
            self.dbname.as_deref().unwrap_or("")
        )
    }
}
