use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::{SmsClient, DEFAULT_VERSION};
use crate::tls::TlsMaterial;
use crate::transport::HttpTransport;

const CONFIG_FILE_NAME: &str = "sms-client.toml";

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    10443
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Certificate files. Relative paths are resolved from the config file location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM bundle of CA certificates to trust in addition to the defaults.
    pub ca_cert: Option<PathBuf>,

    /// PEM client certificate for mutual TLS.
    pub client_cert: Option<PathBuf>,

    /// PEM private key for `client_cert`. If omitted, the key is expected in
    /// the `client_cert` file.
    pub client_key: Option<PathBuf>,
}

impl TlsConfig {
    fn resolve(&self, config_dir: &Path) -> Self {
        let join = |path: &Option<PathBuf>| path.as_ref().map(|p| resolve_path(config_dir, p));
        Self {
            ca_cert: join(&self.ca_cert),
            client_cert: join(&self.client_cert),
            client_key: join(&self.client_key),
        }
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SMS service host name.
    #[serde(default = "default_host")]
    pub host: String,

    /// SMS service port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// API version segment of the base URL.
    #[serde(default = "default_version")]
    pub version: String,

    /// Whole-request timeout in seconds. Unset means the HTTP client default.
    pub timeout_secs: Option<u64>,

    /// Certificate settings.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            version: default_version(),
            timeout_secs: None,
            tls: TlsConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn resolve_path(config_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

/// Loaded configuration with certificate paths made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub version: String,
    pub timeout: Option<Duration>,
    pub tls: TlsConfig,
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        Ok(Self::from_config(config, config_dir))
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            Ok(Self::from_config(Config::default(), &cwd))
        }
    }

    pub fn from_config(config: Config, config_dir: &Path) -> Self {
        Self {
            timeout: config.timeout(),
            tls: config.tls.resolve(config_dir),
            host: config.host,
            port: config.port,
            version: config.version,
        }
    }

    /// Read the configured certificate files.
    pub fn tls_material(&self) -> Result<TlsMaterial> {
        let mut tls = TlsMaterial::new();

        if let Some(ca_cert) = &self.tls.ca_cert {
            tls = tls.with_ca_file(ca_cert)?;
        }

        match (&self.tls.client_cert, &self.tls.client_key) {
            (Some(cert), Some(key)) => tls = tls.with_identity_files(cert, key)?,
            (Some(cert), None) => tls = tls.with_identity_files(cert, cert)?,
            (None, Some(key)) => anyhow::bail!(
                "tls.client_key is set ({}) but tls.client_cert is missing",
                key.display()
            ),
            (None, None) => {}
        }

        Ok(tls)
    }

    /// Build an HTTPS client for the configured service.
    pub fn connect(&self) -> Result<SmsClient<HttpTransport>> {
        let tls = self.tls_material()?;
        let transport = HttpTransport::from_tls(&tls, self.timeout)
            .context("Failed to configure HTTPS transport")?;
        Ok(SmsClient::with_version(
            &self.host,
            self.port,
            &self.version,
            transport,
        ))
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./sms-client.toml` if it exists in current directory
/// 2. `~/.config/sms-client/sms-client.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from(CONFIG_FILE_NAME);
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sms-client").join(CONFIG_FILE_NAME);
    }

    local_config
}
