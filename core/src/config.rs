//! Client credentials and connection settings.
//!
//! Credentials and certificate paths have no defaults: a `ClientConfig` can
//! only be built once the caller supplies them. Several independently
//! configured clients can coexist in one process.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;

pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.visa.com";
pub const PRODUCTION_BASE_URL: &str = "https://api.visa.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Basic-auth user id and password issued for the project.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// `Authorization` header value: `Basic base64(user_id:password)`.
    pub fn basic_auth_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.user_id, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// PEM files used for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePaths {
    /// Client certificate (chain), PEM.
    pub client_cert: PathBuf,
    /// Private key for `client_cert`, PEM.
    pub client_key: PathBuf,
    /// CA bundle trusted for the server certificate, PEM.
    pub ca_cert: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
    /// Any other base URL, e.g. a local stand-in. Plain `http://` is accepted
    /// for test stand-ins only: no client certificate is presented over it,
    /// and `MutualTlsTransport::new` logs a warning.
    Custom(String),
}

impl Environment {
    pub fn base_url(&self) -> &str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Custom(url) => url,
        }
    }

    fn parse(value: &str) -> Result<Self, ApiError> {
        match value.trim() {
            "" | "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            url if url.starts_with("https://") || url.starts_with("http://") => {
                Ok(Environment::Custom(url.to_string()))
            }
            other => Err(ApiError::Config(format!(
                "VISA_ENVIRONMENT must be sandbox, production or a URL, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub certificates: CertificatePaths,
    pub environment: Environment,
    /// Deadline for a whole request, connect to last body byte. `None` waits
    /// forever.
    pub timeout: Option<Duration>,
    /// TEST ONLY: accept any server certificate. Never set this against a
    /// real endpoint.
    pub danger_skip_server_verification: bool,
}

impl ClientConfig {
    pub fn new(credentials: Credentials, certificates: CertificatePaths) -> Self {
        Self {
            credentials,
            certificates,
            environment: Environment::Sandbox,
            timeout: Some(DEFAULT_TIMEOUT),
            danger_skip_server_verification: false,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// TEST ONLY: turn off server certificate verification.
    pub fn danger_skip_server_verification(mut self) -> Self {
        self.danger_skip_server_verification = true;
        self
    }

    /// Read the configuration from `VISA_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup using the same
    /// keys as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} must be set")))
        };

        let credentials = Credentials::new(required("VISA_USER_ID")?, required("VISA_PASSWORD")?);
        let certificates = CertificatePaths {
            client_cert: required("VISA_CLIENT_CERT")?.into(),
            client_key: required("VISA_CLIENT_KEY")?.into(),
            ca_cert: required("VISA_CA_CERT")?.into(),
        };
        let environment = match lookup("VISA_ENVIRONMENT") {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Sandbox,
        };
        let timeout = match lookup("VISA_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value.trim().parse().map_err(|_| {
                    ApiError::Config(format!("VISA_TIMEOUT_SECS must be a number of seconds, got {value:?}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => Some(DEFAULT_TIMEOUT),
        };

        Ok(Self {
            credentials,
            certificates,
            environment,
            timeout,
            danger_skip_server_verification: false,
        })
    }
}
