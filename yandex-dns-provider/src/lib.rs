//! # yandex-dns-provider
//!
//! Yandex Cloud DNS client for reconciliation controllers (external-DNS
//! style sync loops).
//!
//! The client does three things:
//!
//! - [`YandexDnsClient::list_zones`]: every zone in the bound folder,
//!   following the listing cursor to the end.
//! - [`YandexDnsClient::list_record_sets`]: every record set of one zone.
//! - [`YandexDnsClient::upsert_record_sets`]: deletions, replacements and
//!   merges for one zone, sent as a single call.
//!
//! Deciding *what* to delete, replace or merge is left to the caller.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for static builds and cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use yandex_dns_provider::{
//!     ClientConfig, CredentialSource, RecordSet, UpsertRequest, YandexDnsClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(
//!         "b1gexamplefolder",
//!         CredentialSource::ServiceAccountKeyFile("/etc/yc/key.json".into()),
//!     );
//!     let client = YandexDnsClient::connect(&config).await?;
//!
//!     for zone in client.list_zones().await? {
//!         let record_sets = client.list_record_sets(&zone.id).await?;
//!         println!("{} ({} record sets)", zone.name, record_sets.len());
//!     }
//!
//!     let request = UpsertRequest::new("dns1example")
//!         .replace(RecordSet::new("www.example.com.", "A", 300, ["10.0.0.1"]))
//!         .merge(RecordSet::new("example.com.", "TXT", 300, ["\"owner=me\""]));
//!     client.upsert_record_sets(&request).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Client operations return [`ClientResult<T>`]. A [`DnsClientError`] names
//! the failed [`Operation`] (its message starts with e.g.
//! `failed to list zones:`) and carries a [`ProviderError`] kind:
//!
//! - [`ProviderError::Configuration`]: bad config or unreadable key, raised before any I/O
//! - [`ProviderError::InvalidCredentials`]: IAM rejected the key or token
//! - [`ProviderError::ZoneNotFound`]: unknown or inaccessible zone
//! - [`ProviderError::ConflictingBuckets`]: one `(name, type)` in two upsert buckets
//! - [`ProviderError::NetworkError`], [`ProviderError::Timeout`],
//!   [`ProviderError::RateLimited`]: transient, see [`DnsClientError::is_retryable`]
//!
//! Upserts are never retried. Listing calls are retried only when
//! [`ClientConfig::max_read_retries`] is set.

mod auth;
mod client;
mod config;
mod error;
mod http_client;
mod pagination;
mod traits;
mod transport;
mod types;
mod utils;

// Re-export error types
pub use error::{ClientResult, DnsClientError, Operation, ProviderError, Result};

// Re-export configuration
pub use config::{ClientConfig, CredentialSource, DEFAULT_DNS_ENDPOINT, DEFAULT_IAM_ENDPOINT, env};

// Re-export client and transport seam (internal traits are not exported)
pub use client::YandexDnsClient;
pub use traits::{DnsTransport, Page};
pub use transport::HttpTransport;

// Re-export types
pub use types::{RecordSet, UpsertRequest, Zone};
