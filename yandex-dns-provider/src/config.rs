//! Client configuration and construction-time validation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{ProviderError, Result};

/// Default Yandex Cloud DNS REST endpoint.
pub const DEFAULT_DNS_ENDPOINT: &str = "https://dns.api.cloud.yandex.net/dns/v1";
/// Default IAM token exchange endpoint.
pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.api.cloud.yandex.net/iam/v1/tokens";

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable names read by [`ClientConfig::from_env`].
pub mod env {
    /// Folder whose zones the client manages.
    pub const FOLDER_ID: &str = "YC_FOLDER_ID";
    /// Path to a service account authorized key JSON file.
    pub const SERVICE_ACCOUNT_KEY_FILE: &str = "YC_SERVICE_ACCOUNT_KEY_FILE";
    /// Pre-issued IAM token, used when no key file is given.
    pub const IAM_TOKEN: &str = "YC_IAM_TOKEN";
    /// DNS API endpoint override.
    pub const DNS_ENDPOINT: &str = "YC_DNS_ENDPOINT";
    /// IAM token endpoint override.
    pub const IAM_ENDPOINT: &str = "YC_IAM_ENDPOINT";
    /// Number of retries for read-only calls.
    pub const MAX_READ_RETRIES: &str = "YC_MAX_READ_RETRIES";
}

/// Where the client gets its credential material from.
#[derive(Debug)]
pub enum CredentialSource {
    /// Path to a service account authorized key (`id`, `service_account_id`, `private_key`).
    ServiceAccountKeyFile(PathBuf),
    /// The content of an authorized key file, inline.
    ServiceAccountKeyJson(SecretString),
    /// A pre-issued IAM token. Never refreshed.
    IamToken(SecretString),
}

impl CredentialSource {
    fn check_not_empty(&self) -> Result<()> {
        let missing = match self {
            Self::ServiceAccountKeyFile(path) => path.as_os_str().is_empty(),
            Self::ServiceAccountKeyJson(json) => json.expose_secret().trim().is_empty(),
            Self::IamToken(token) => token.expose_secret().trim().is_empty(),
        };

        if missing {
            return Err(ProviderError::Configuration {
                detail: format!("{} must be set", self.label()),
            });
        }
        Ok(())
    }

    /// Human-readable name of the credential reference.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ServiceAccountKeyFile(_) => "service account key file",
            Self::ServiceAccountKeyJson(_) => "service account key",
            Self::IamToken(_) => "IAM token",
        }
    }
}

/// Everything needed to build a [`YandexDnsClient`](crate::YandexDnsClient).
///
/// ```rust
/// use yandex_dns_provider::{ClientConfig, CredentialSource};
///
/// let config = ClientConfig::new(
///     "b1gexamplefolder",
///     CredentialSource::ServiceAccountKeyFile("/etc/yc/key.json".into()),
/// )
/// .max_read_retries(2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug)]
pub struct ClientConfig {
    /// Folder that bounds which zones are listed.
    pub folder_id: String,
    /// Credential material.
    pub credentials: CredentialSource,
    /// DNS API endpoint override. `None` uses [`DEFAULT_DNS_ENDPOINT`].
    pub endpoint: Option<String>,
    /// IAM token endpoint override. `None` uses [`DEFAULT_IAM_ENDPOINT`].
    pub iam_endpoint: Option<String>,
    /// Retries for transient failures of listing calls (default: 0).
    ///
    /// Upserts are never retried.
    pub max_read_retries: u32,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with default endpoints and timeouts.
    pub fn new(folder_id: impl Into<String>, credentials: CredentialSource) -> Self {
        Self {
            folder_id: folder_id.into(),
            credentials,
            endpoint: None,
            iam_endpoint: None,
            max_read_retries: 0,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Redirects DNS API calls to `endpoint`.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Redirects the IAM token exchange to `endpoint`.
    #[must_use]
    pub fn iam_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.iam_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the number of retries for listing calls.
    #[must_use]
    pub fn max_read_retries(mut self, retries: u32) -> Self {
        self.max_read_retries = retries;
        self
    }

    /// Sets connect and request timeouts.
    #[must_use]
    pub fn timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Checks the configuration without touching the filesystem or network.
    pub fn validate(&self) -> Result<()> {
        if self.folder_id.trim().is_empty() {
            return Err(ProviderError::Configuration {
                detail: "folder id must be set".to_string(),
            });
        }
        self.credentials.check_not_empty()?;

        for (label, endpoint) in [
            ("endpoint", &self.endpoint),
            ("IAM endpoint", &self.iam_endpoint),
        ] {
            if let Some(url) = endpoint
                && !(url.starts_with("https://") || url.starts_with("http://"))
            {
                return Err(ProviderError::Configuration {
                    detail: format!("{label} must be an http(s) URL, got '{url}'"),
                });
            }
        }

        Ok(())
    }

    /// DNS API base URL without a trailing slash.
    pub fn dns_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_DNS_ENDPOINT)
            .trim_end_matches('/')
    }

    /// IAM token exchange URL.
    pub fn iam_token_endpoint(&self) -> &str {
        self.iam_endpoint.as_deref().unwrap_or(DEFAULT_IAM_ENDPOINT)
    }

    /// Builds a configuration from a flat key-value map using the
    /// [`env`] variable names as keys.
    ///
    /// A key file takes precedence over an IAM token when both are present.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let folder_id = get(env::FOLDER_ID).ok_or_else(|| ProviderError::Configuration {
            detail: format!("{} is not set", env::FOLDER_ID),
        })?;

        let credentials = if let Some(path) = get(env::SERVICE_ACCOUNT_KEY_FILE) {
            CredentialSource::ServiceAccountKeyFile(PathBuf::from(path))
        } else if let Some(token) = get(env::IAM_TOKEN) {
            CredentialSource::IamToken(SecretString::from(token))
        } else {
            return Err(ProviderError::Configuration {
                detail: format!(
                    "one of {} or {} must be set",
                    env::SERVICE_ACCOUNT_KEY_FILE,
                    env::IAM_TOKEN
                ),
            });
        };

        let mut config = Self::new(folder_id, credentials);
        config.endpoint = get(env::DNS_ENDPOINT);
        config.iam_endpoint = get(env::IAM_ENDPOINT);
        if let Some(retries) = get(env::MAX_READ_RETRIES) {
            config.max_read_retries =
                retries
                    .parse()
                    .map_err(|e| ProviderError::Configuration {
                        detail: format!("{}: {e}", env::MAX_READ_RETRIES),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from the process environment. See [`env`].
    pub fn from_env() -> Result<Self> {
        let keys = [
            env::FOLDER_ID,
            env::SERVICE_ACCOUNT_KEY_FILE,
            env::IAM_TOKEN,
            env::DNS_ENDPOINT,
            env::IAM_ENDPOINT,
            env::MAX_READ_RETRIES,
        ];
        let map = keys
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| ((*key).to_string(), v)))
            .collect();
        Self::from_map(&map)
    }
}
