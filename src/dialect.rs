//! Dialect registry.
//!
//! Maps a server identifier to the syntax capabilities the compiler needs.
//! Everything downstream asks [`Capabilities`] what is allowed and never
//! branches on the dialect itself.

use std::str::FromStr;

use serde::Serialize;

use crate::error::{QmapError, QmapResult};

/// Supported SQL server families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    MariaDb,
    Postgres,
    SqlServer,
    Dblib,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::MySql
    }
}

/// A connection attribute that a session can report through `info()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAttribute {
    DriverName,
    ErrorMode,
    ServerInfo,
    ServerVersion,
    ClientVersion,
    ConnectionStatus,
}

impl StatusAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            StatusAttribute::DriverName => "driver_name",
            StatusAttribute::ErrorMode => "error_mode",
            StatusAttribute::ServerInfo => "server_info",
            StatusAttribute::ServerVersion => "server_version",
            StatusAttribute::ClientVersion => "client_version",
            StatusAttribute::ConnectionStatus => "connection_status",
        }
    }
}

impl std::fmt::Display for StatusAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const FULL_STATUS: &[StatusAttribute] = &[
    StatusAttribute::DriverName,
    StatusAttribute::ErrorMode,
    StatusAttribute::ServerInfo,
    StatusAttribute::ServerVersion,
    StatusAttribute::ClientVersion,
    StatusAttribute::ConnectionStatus,
];

const BASIC_STATUS: &[StatusAttribute] = &[StatusAttribute::DriverName, StatusAttribute::ErrorMode];

/// Immutable syntax capabilities of one dialect.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub dialect: Dialect,
    /// Driver family name used when opening connections.
    pub driver: &'static str,
    /// Trailing `LIMIT n OFFSET m` pagination.
    pub supports_limit_offset: bool,
    /// Prefix `TOP (n)` pagination.
    pub supports_top: bool,
    /// The server casts date/time strings on its own.
    pub supports_native_date_cast: bool,
    /// `\` escapes the next character inside quotes and `#` starts a comment.
    pub backslash_escapes: bool,
    pub status_attributes: &'static [StatusAttribute],
}

static MYSQL: Capabilities = Capabilities {
    dialect: Dialect::MySql,
    driver: "mysql",
    supports_limit_offset: true,
    supports_top: false,
    supports_native_date_cast: true,
    backslash_escapes: true,
    status_attributes: FULL_STATUS,
};

static MARIADB: Capabilities = Capabilities {
    dialect: Dialect::MariaDb,
    driver: "mysql",
    supports_limit_offset: true,
    supports_top: false,
    supports_native_date_cast: true,
    backslash_escapes: true,
    status_attributes: FULL_STATUS,
};

static POSTGRES: Capabilities = Capabilities {
    dialect: Dialect::Postgres,
    driver: "pgsql",
    supports_limit_offset: true,
    supports_top: false,
    supports_native_date_cast: true,
    backslash_escapes: false,
    status_attributes: FULL_STATUS,
};

static SQLSERVER: Capabilities = Capabilities {
    dialect: Dialect::SqlServer,
    driver: "sqlsrv",
    supports_limit_offset: false,
    supports_top: true,
    supports_native_date_cast: false,
    backslash_escapes: false,
    status_attributes: BASIC_STATUS,
};

static DBLIB: Capabilities = Capabilities {
    dialect: Dialect::Dblib,
    driver: "dblib",
    supports_limit_offset: false,
    supports_top: true,
    supports_native_date_cast: false,
    backslash_escapes: false,
    status_attributes: BASIC_STATUS,
};

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::MySql,
        Dialect::MariaDb,
        Dialect::Postgres,
        Dialect::SqlServer,
        Dialect::Dblib,
    ];

    pub fn capabilities(&self) -> &'static Capabilities {
        match self {
            Dialect::MySql => &MYSQL,
            Dialect::MariaDb => &MARIADB,
            Dialect::Postgres => &POSTGRES,
            Dialect::SqlServer => &SQLSERVER,
            Dialect::Dblib => &DBLIB,
        }
    }

    /// Canonical server identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::MariaDb => "mariadb",
            Dialect::Postgres => "pgsql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Dblib => "dblib",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Dialect {
    type Err = QmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "mariadb" => Ok(Dialect::MariaDb),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "dblib" => Ok(Dialect::Dblib),
            _ => Err(QmapError::UnsupportedDialect(s.to_string())),
        }
    }
}

/// Resolve a server identifier to its capabilities.
pub fn lookup(dialect_id: &str) -> QmapResult<&'static Capabilities> {
    dialect_id.parse::<Dialect>().map(|d| d.capabilities())
}
