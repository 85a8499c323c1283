//! Configuration for the studzone client
//!
//! Credentials can come from a JSON document (`{"credentials": {...}}`) or from
//! the environment (with `.env` support). Whatever the source, the values are
//! validated before any network call is made.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{PortalError, Result};

/// Base URL of the student zone
pub const DEFAULT_BASE_URL: &str = "https://ecampus.psgtech.ac.in/studzone";

/// Default User-Agent mimicking a modern browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ENV_ROLL_NUMBER: &str = "STUDZONE_ROLL_NUMBER";
const ENV_PASSWORD: &str = "STUDZONE_PASSWORD";
const ENV_BASE_URL: &str = "STUDZONE_BASE_URL";

/// Login credentials for the portal
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Roll number (role identifier); sent uppercased
    pub roll_number: String,
    /// Portal password
    pub password: String,
}

impl Credentials {
    pub fn new(roll_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            password: password.into(),
        }
    }

    /// Check that both fields carry a value.
    pub fn validate(&self) -> Result<()> {
        if self.roll_number.trim().is_empty() {
            return Err(PortalError::Config("roll_number is missing".to_string()));
        }
        if self.password.is_empty() {
            return Err(PortalError::Config("password is missing".to_string()));
        }
        Ok(())
    }
}

// Never print the password.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("roll_number", &self.roll_number)
            .field("password", &"***")
            .finish()
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Portal base URL; the login form lives here (default: [`DEFAULT_BASE_URL`])
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at another base URL, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Absolute URL for a path below the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(PortalError::InvalidUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(PortalError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Shape of the JSON config file
#[derive(Deserialize)]
struct ConfigFile {
    credentials: Credentials,
    #[serde(default)]
    base_url: Option<String>,
}

/// Everything a portal session needs
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub credentials: Credentials,
    pub client: ClientConfig,
}

impl PortalConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            client: ClientConfig::default(),
        }
    }

    pub fn with_client(credentials: Credentials, client: ClientConfig) -> Self {
        Self {
            credentials,
            client,
        }
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// `PortalError::Config` if the document is malformed or a credential is blank.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)
            .map_err(|e| PortalError::Config(format!("invalid config document: {}", e)))?;

        let mut client = ClientConfig::default();
        if let Some(base_url) = file.base_url {
            client.base_url = base_url;
        }

        let config = Self::with_client(file.credentials, client);
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file (e.g. `config.json`).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PortalError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Load credentials from `STUDZONE_*` environment variables.
    ///
    /// A `.env` file in the working directory is honoured when present.
    pub fn from_env() -> Result<Self> {
        // Don't fail if .env doesn't exist.
        let _ = dotenv::dotenv();

        let roll_number = std::env::var(ENV_ROLL_NUMBER)
            .map_err(|_| PortalError::Config(format!("{} is not set", ENV_ROLL_NUMBER)))?;
        let password = std::env::var(ENV_PASSWORD)
            .map_err(|_| PortalError::Config(format!("{} is not set", ENV_PASSWORD)))?;

        let mut client = ClientConfig::default();
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            client.base_url = base_url;
        }

        let config = Self::with_client(Credentials::new(roll_number, password), client);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        self.client.validate()
    }
}
