//! Server configuration.
//!
//! Layers, lowest precedence first: built-in defaults, the YAML file given
//! with `--config`, `LOYALTY__*` environment variables (`__` separates
//! nesting levels, e.g. `LOYALTY__SERVER__PORT`), then CLI flags.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use loyalty_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "LOYALTY__";

const MEMORY_DSN: &str = "sqlite::memory:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_owned(),
            port: 8087,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Any DSN `SeaORM` accepts: `sqlite://...`, `postgres://...`.
    pub dsn: String,
    pub max_conns: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://loyalty.db?mode=rwc".to_owned(),
            max_conns: 10,
        }
    }
}

impl DatabaseConfig {
    /// In-memory `SQLite` keeps one database per connection.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.dsn.starts_with(MEMORY_DSN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Command-line values that take precedence over every other layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    /// Fails when `path` does not point to a file, or when a layer holds a
    /// malformed or unknown key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if cli.mock {
            MEMORY_DSN.clone_into(&mut self.database.dsn);
            self.database.max_conns = 1;
        }
    }

    /// Semantic checks serde cannot express.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.database.dsn.trim().is_empty() {
            bail!("database.dsn must not be empty");
        }
        if self.database.max_conns == 0 {
            bail!("database.max_conns must be at least 1");
        }
        if self.ledger.max_page_size == 0 {
            bail!("ledger.max_page_size must be at least 1");
        }
        Ok(())
    }

    /// Address the HTTP listener binds to.
    ///
    /// # Errors
    /// Fails when `server.bind_addr` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid server.bind_addr: {}", self.server.bind_addr))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Render as YAML for `--print-config` and `check`.
    ///
    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| anyhow::anyhow!("failed to render configuration: {e}"))
    }
}
