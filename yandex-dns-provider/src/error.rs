use serde::{Deserialize, Serialize};

/// Provider identifier used as the prefix of every error message and log line.
pub(crate) const PROVIDER_NAME: &str = "yandexcloud";

/// Error kinds produced while talking to Yandex Cloud DNS.
///
/// All variants are serializable for structured error reporting. The
/// operation that failed is attached one level up, by [`DnsClientError`].
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
///
/// The client itself never retries mutations. Read-only listing calls are
/// retried only when [`ClientConfig::max_read_retries`](crate::ClientConfig)
/// is non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Client configuration is missing or malformed (empty folder id, empty
    /// credential reference, unreadable or unparseable key file, ...).
    ///
    /// Raised at construction time, before any network activity.
    Configuration {
        /// What is wrong with the configuration.
        detail: String,
    },

    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The credentials were rejected by IAM or the token is expired.
    InvalidCredentials {
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The service account lacks a role for the requested operation.
    PermissionDenied {
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The DNS zone does not exist or is not visible to the caller.
    ZoneNotFound {
        /// ID of the zone that was not found.
        zone_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid (bad TTL value, malformed record name, ...).
    InvalidParameter {
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The same `(name, type)` record set appears in more than one bucket of
    /// an upsert request.
    ///
    /// The outcome of such a request is undefined on the provider side, so it
    /// is rejected before it is sent.
    ConflictingBuckets {
        /// Record set name.
        name: String,
        /// Record set type.
        record_type: String,
        /// Buckets that both contain the record set, e.g. `"deletions, merges"`.
        buckets: String,
    },

    /// The folder's resource quota has been exceeded.
    ///
    /// Unlike [`RateLimited`](Self::RateLimited), this is not a transient condition.
    QuotaExceeded {
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded (HTTP 429 or `RESOURCE_EXHAUSTED`).
    RateLimited {
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The call was cancelled by the caller before it completed.
    Cancelled,

    /// Failed to parse the API response.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized error from the API.
    Unknown {
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（配置、用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::ZoneNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::ConflictingBuckets { .. }
                | Self::QuotaExceeded { .. }
                | Self::Cancelled
        )
    }

    /// Whether the failure is transient and the same call may succeed later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let provider = PROVIDER_NAME;
        match self {
            Self::Configuration { detail } => {
                write!(f, "[{provider}] Invalid configuration: {detail}")
            }
            Self::NetworkError { detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials { raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::PermissionDenied { raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::ZoneNotFound {
                zone_id,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Zone '{zone_id}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Zone '{zone_id}' not found")
                }
            }
            Self::InvalidParameter { param, detail } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::ConflictingBuckets {
                name,
                record_type,
                buckets,
            } => {
                write!(
                    f,
                    "[{provider}] Record set '{name}' ({record_type}) appears in more than one bucket: {buckets}"
                )
            }
            Self::QuotaExceeded { .. } => {
                write!(f, "[{provider}] Quota exceeded")
            }
            Self::RateLimited { retry_after, .. } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::Timeout { detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::Cancelled => {
                write!(f, "[{provider}] Request cancelled")
            }
            Self::ParseError { detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Unknown { raw_message, .. } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Client-level operation an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Building the client: config validation, key loading, IAM exchange.
    Connect,
    /// Walking the zone listing of the bound folder.
    ListZones,
    /// Listing the record sets of one zone.
    ListRecordSets,
    /// Applying a deletions/replacements/merges batch to one zone.
    UpsertRecordSets,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Connect => "failed to build client",
            Self::ListZones => "failed to list zones",
            Self::ListRecordSets => "failed to list record sets",
            Self::UpsertRecordSets => "failed to upsert record sets",
        })
    }
}

/// Error returned by every public [`YandexDnsClient`](crate::YandexDnsClient) operation.
///
/// The message starts with a stable prefix naming the failed operation,
/// followed by the underlying [`ProviderError`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation}: {source}")]
pub struct DnsClientError {
    /// The operation that failed.
    pub operation: Operation,
    /// The underlying error kind.
    #[source]
    pub source: ProviderError,
}

impl DnsClientError {
    pub(crate) fn new(operation: Operation, source: ProviderError) -> Self {
        Self { operation, source }
    }

    /// The underlying error kind.
    pub fn kind(&self) -> &ProviderError {
        &self.source
    }

    /// See [`ProviderError::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }

    /// Whether the failure came from a cancelled call.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, ProviderError::Cancelled)
    }
}

/// Result type of the public client operations.
pub type ClientResult<T> = std::result::Result<T, DnsClientError>;

/// Attaches an [`Operation`] to a [`ProviderError`] result.
pub(crate) trait WithOperation<T> {
    fn during(self, operation: Operation) -> ClientResult<T>;
}

impl<T> WithOperation<T> for Result<T> {
    fn during(self, operation: Operation) -> ClientResult<T> {
        self.map_err(|e| DnsClientError::new(operation, e))
    }
}
