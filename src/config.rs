use crate::{
    identity::IdentityMode,
    services::storage_service::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_TTL_SECS},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Origin clients use to reach this server; prefixes generated URLs.
    pub public_url: String,
    pub upload_url_ttl_secs: i64,
    pub max_upload_bytes: u64,
    pub identity: IdentityMode,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Event photo gallery API")]
pub struct Args {
    /// Host to bind to (overrides GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded blobs are stored (overrides GALLERY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides GALLERY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public base URL for upload and blob links (overrides GALLERY_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Lifetime of generated upload URLs in seconds (overrides GALLERY_UPLOAD_URL_TTL_SECS)
    #[arg(long)]
    pub upload_url_ttl_secs: Option<i64>,

    /// Largest accepted upload in bytes (overrides GALLERY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<u64>,

    /// How viewers are identified (overrides GALLERY_IDENTITY)
    #[arg(long, value_enum)]
    pub identity: Option<IdentityMode>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |name| env::var(name))?;
        Ok((cfg, migrate))
    }

    /// Merge parsed arguments over values read through `lookup`, then defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let text = |name: &str| -> Result<Option<String>> {
            match lookup(name) {
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {}", name)),
            }
        };

        let env_port = parse_var::<u16>("GALLERY_PORT", text("GALLERY_PORT")?)?;
        let env_ttl = parse_var::<i64>(
            "GALLERY_UPLOAD_URL_TTL_SECS",
            text("GALLERY_UPLOAD_URL_TTL_SECS")?,
        )?;
        let env_max = parse_var::<u64>(
            "GALLERY_MAX_UPLOAD_BYTES",
            text("GALLERY_MAX_UPLOAD_BYTES")?,
        )?;
        let env_identity = match text("GALLERY_IDENTITY")? {
            Some(value) => Some(
                <IdentityMode as ValueEnum>::from_str(&value, true)
                    .map_err(|err| anyhow::anyhow!(err))
                    .with_context(|| format!("parsing GALLERY_IDENTITY value `{}`", value))?,
            ),
            None => None,
        };

        let port = args.port.or(env_port).unwrap_or(3000);
        let public_url = args
            .public_url
            .or(text("GALLERY_PUBLIC_URL")?)
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        Ok(Self {
            host: args
                .host
                .or(text("GALLERY_HOST")?)
                .unwrap_or_else(|| "0.0.0.0".into()),
            port,
            storage_dir: args
                .storage_dir
                .or(text("GALLERY_STORAGE_DIR")?)
                .unwrap_or_else(|| "./data/blobs".into()),
            database_url: args
                .database_url
                .or(text("GALLERY_DATABASE_URL")?)
                .unwrap_or_else(|| "sqlite://./data/meta/gallery.db".into()),
            public_url,
            upload_url_ttl_secs: args
                .upload_url_ttl_secs
                .or(env_ttl)
                .unwrap_or(DEFAULT_UPLOAD_TTL_SECS),
            max_upload_bytes: args
                .max_upload_bytes
                .or(env_max)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            identity: args.identity.or(env_identity).unwrap_or_default(),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value))
    })
    .transpose()
}
