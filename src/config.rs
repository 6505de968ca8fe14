use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, time::Duration};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub store: StoreConfig,
}

/// Connection settings for the S3-compatible store.
///
/// Read once at startup and handed by reference to the store client.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub endpoint: String,
    pub port: u16,
    pub use_ssl: bool,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

impl StoreConfig {
    /// Base URL of the store, e.g. `http://localhost:9000`.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.endpoint, self.port)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "File upload front-end for S3-compatible stores")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Store endpoint host (overrides MINIO_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bucket holding uploaded files (overrides MINIO_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Per-request timeout in seconds (overrides REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Largest accepted upload body in bytes (overrides MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::from_lookup(args, |name| env::var(name).ok())
    }

    /// Build the config from `args` and a variable lookup.
    pub fn from_lookup<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => bail!("missing required environment variable {}", name),
            }
        };

        let endpoint = match args.endpoint {
            Some(endpoint) => endpoint,
            None => required("MINIO_ENDPOINT")?,
        };
        let store_port = parse_var::<u16>("MINIO_PORT", &required("MINIO_PORT")?)?;
        let use_ssl = parse_flag("MINIO_USE_SSL", &required("MINIO_USE_SSL")?)?;
        let bucket = match args.bucket {
            Some(bucket) => bucket,
            None => required("MINIO_BUCKET_NAME")?,
        };

        let store = StoreConfig {
            endpoint,
            port: store_port,
            use_ssl,
            access_key: required("MINIO_ACCESS_KEY")?,
            secret_key: required("MINIO_SECRET_KEY")?,
            bucket,
        };

        // --- Optional settings ---
        let env_port = optional_var("PORT", &lookup)?.unwrap_or(DEFAULT_PORT);
        let env_timeout =
            optional_var("REQUEST_TIMEOUT_SECS", &lookup)?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let env_max_upload =
            optional_var("MAX_UPLOAD_BYTES", &lookup)?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let env_host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.into());

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            request_timeout: Duration::from_secs(args.request_timeout_secs.unwrap_or(env_timeout)),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            store,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("parsing {} value `{}`", name, value))
}

fn optional_var<T, F>(name: &str, lookup: &F) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|value| parse_var(name, &value)).transpose()
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => bail!("parsing {} value `{}`: expected true or false", name, other),
    }
}
