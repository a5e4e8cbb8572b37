//! Yandex Cloud DNS REST transport

mod api;
mod error;
mod http;
/// Yandex Cloud DNS API request/response types.
pub(crate) mod types;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::auth::TokenSource;
use crate::config::ClientConfig;
use crate::error::{PROVIDER_NAME, Result};
use crate::http_client::create_http_client;

/// Maximum page size accepted by the list endpoints.
pub(crate) const MAX_PAGE_SIZE: u32 = 1000;

/// [`DnsTransport`](crate::DnsTransport) over the Yandex Cloud DNS REST API.
///
/// Authenticates with an IAM token obtained from the configured
/// [`CredentialSource`](crate::CredentialSource). The underlying connection
/// pool is shared, so one transport can serve concurrent calls.
///
/// ```rust,no_run
/// use yandex_dns_provider::{ClientConfig, CredentialSource, HttpTransport};
///
/// # async fn run() -> Result<(), yandex_dns_provider::ProviderError> {
/// let config = ClientConfig::new(
///     "b1gexamplefolder",
///     CredentialSource::ServiceAccountKeyFile("/etc/yc/key.json".into()),
/// );
/// let transport = HttpTransport::connect(&config).await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
    pub(crate) tokens: TokenSource,
    pub(crate) max_read_retries: u32,
    pub(crate) cancel: CancellationToken,
}

impl HttpTransport {
    /// Validates `config`, loads credentials and exchanges them for an IAM token.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        Self::connect_with_cancellation(config, CancellationToken::new()).await
    }

    /// Like [`connect`](Self::connect); every call made through this transport
    /// fails with [`ProviderError::Cancelled`](crate::ProviderError::Cancelled)
    /// once `cancel` fires.
    pub async fn connect_with_cancellation(
        config: &ClientConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        config.validate()?;

        let client = create_http_client(config.connect_timeout, config.request_timeout)?;
        let tokens = TokenSource::connect(
            &config.credentials,
            client.clone(),
            config.iam_token_endpoint(),
            &cancel,
        )
        .await?;

        log::debug!(
            "[{PROVIDER_NAME}] Transport ready: endpoint={}, credentials={}, max_read_retries={}",
            config.dns_endpoint(),
            config.credentials.label(),
            config.max_read_retries
        );

        Ok(Self {
            client,
            endpoint: config.dns_endpoint().to_string(),
            tokens,
            max_read_retries: config.max_read_retries,
            cancel,
        })
    }
}
