use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_driver: StorageDriver,
    pub storage_dir: String,
    pub public_url: String,
    /// Lifetime of issued bearer tokens, in seconds.
    pub token_lifetime: i64,
    /// Seconds between two expired-token sweeps.
    pub token_sweep_interval: u64,
}

/// Which disk backs image files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDriver {
    Local,
    Memory,
}

impl FromStr for StorageDriver {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "public" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown storage driver `{other}` (expected `local` or `memory`)"),
        }
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Product catalog REST API")]
pub struct Args {
    /// Host to bind to (overrides CATALOG_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CATALOG_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides CATALOG_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Storage driver for images: `local` or `memory` (overrides CATALOG_STORAGE_DRIVER)
    #[arg(long)]
    pub storage_driver: Option<String>,

    /// Directory where image files are stored (overrides CATALOG_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Base URL image links are built from (overrides CATALOG_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Token lifetime in seconds (overrides CATALOG_TOKEN_LIFETIME)
    #[arg(long)]
    pub token_lifetime: Option<i64>,

    /// Seconds between expired token sweeps (overrides CATALOG_TOKEN_SWEEP_INTERVAL)
    #[arg(long)]
    pub token_sweep_interval: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What the binary should do once configured.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Run migrations and exit
    Migrate,
    /// Delete expired auth tokens and exit
    SweepTokens,
    /// Create a user account and exit
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the command to run.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_parse("CATALOG_PORT", 3000u16)?;
        let env_db = env::var("CATALOG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/catalog.db".into());
        let env_driver =
            env::var("CATALOG_STORAGE_DRIVER").unwrap_or_else(|_| "local".into());
        let env_storage =
            env::var("CATALOG_STORAGE_DIR").unwrap_or_else(|_| "./data/public".into());
        let env_public_url = env::var("CATALOG_PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:3000/storage".into());
        let env_lifetime = env_parse("CATALOG_TOKEN_LIFETIME", 3600i64)?;
        let env_sweep = env_parse("CATALOG_TOKEN_SWEEP_INTERVAL", 300u64)?;

        // --- Merge ---
        let driver = args.storage_driver.unwrap_or(env_driver);
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            storage_driver: driver.parse()?,
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            public_url: args.public_url.unwrap_or(env_public_url),
            token_lifetime: args.token_lifetime.unwrap_or(env_lifetime),
            token_sweep_interval: args.token_sweep_interval.unwrap_or(env_sweep),
        };

        if cfg.token_lifetime <= 0 {
            bail!("token lifetime must be positive, got {}", cfg.token_lifetime);
        }

        Ok((cfg, args.command.unwrap_or(Command::Serve)))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            database_url: "sqlite::memory:".into(),
            storage_driver: StorageDriver::Memory,
            storage_dir: "./data/public".into(),
            public_url: "http://localhost:3000/storage".into(),
            token_lifetime: 3600,
            token_sweep_interval: 300,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {key} value `{value}`")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {key}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_driver_parses_known_names() {
        assert_eq!("local".parse::<StorageDriver>().unwrap(), StorageDriver::Local);
        assert_eq!("MEMORY".parse::<StorageDriver>().unwrap(), StorageDriver::Memory);
        assert!("s3".parse::<StorageDriver>().is_err());
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::parse_from([
            "catalog-api",
            "--port",
            "8080",
            "create-user",
            "--name",
            "Admin",
            "--email",
            "admin@test.com",
            "--password",
            "admin",
        ]);
        assert_eq!(args.port, Some(8080));
        assert!(matches!(args.command, Some(Command::CreateUser { ref email, .. }) if email == "admin@test.com"));
    }
}
