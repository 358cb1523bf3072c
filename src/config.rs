//! Session configuration.
//!
//! Read from TOML:
//!
//! ```toml
//! server = "pgsql"
//! host = "db.internal"
//! username = "app"
//! password = "s3cret"
//! database = "shop"
//! port = 5432
//! prefix = "shop_"
//! ```
//!
//! `url`, when present, overrides the individual connection fields.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::dialect::{self, Dialect};
use crate::error::{QmapError, QmapResult};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "qmap.toml";

/// Connection and compilation settings for a [`crate::engine::Session`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Dialect identifier (`mysql`, `mariadb`, `pgsql`, `sqlserver`, `dblib`).
    pub server: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    /// Prepended to every table name.
    pub prefix: String,
    /// Pool size.
    pub max_connections: u32,
    /// Full connection URL, used as-is when set.
    pub url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server: "mysql".to_string(),
            host: "localhost".to_string(),
            username: String::new(),
            password: String::new(),
            database: "test".to_string(),
            port: 3306,
            prefix: String::new(),
            max_connections: 5,
            url: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> QmapResult<Self> {
        toml::from_str(content).map_err(|e| QmapError::Config(e.to_string()))
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> QmapResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// `./qmap.toml`, then `<config dir>/qmap/config.toml`, else defaults.
    pub fn discover() -> QmapResult<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading session config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("qmap").join("config.toml"));
        }
        paths
    }

    pub fn dialect(&self) -> QmapResult<Dialect> {
        dialect::lookup(&self.server).map(|caps| caps.dialect)
    }

    /// Connection URL for the configured server.
    ///
    /// Credentials are percent-encoded. Dialects without a driver in this
    /// build are rejected with `UnsupportedDriver`.
    pub fn connection_url(&self) -> QmapResult<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let dialect = self.dialect()?;
        let scheme = match dialect {
            Dialect::MySql | Dialect::MariaDb => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::SqlServer | Dialect::Dblib => {
                return Err(QmapError::UnsupportedDriver(
                    dialect.capabilities().driver.to_string(),
                ))
            }
        };

        let invalid = |e: url::ParseError| QmapError::Config(format!("invalid host '{}': {}", self.host, e));
        let mut url = Url::parse(&format!("{}://{}", scheme, self.host)).map_err(invalid)?;

        let rejected = |what: &str| QmapError::Config(format!("cannot set {} on '{}'", what, self.host));
        if !self.username.is_empty() {
            url.set_username(&self.username).map_err(|_| rejected("username"))?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| rejected("password"))?;
        }
        url.set_port(Some(self.port)).map_err(|_| rejected("port"))?;
        url.set_path(&self.database);

        Ok(url.to_string())
    }
}

/// Builder for SessionConfig
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the dialect identifier
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = server.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set username and password
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the table prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.config.max_connections = max;
        self
    }

    /// Use a full connection URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> SessionConfig {
        self.config
    }
}
