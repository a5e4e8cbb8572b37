//! IAM token 获取与刷新

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::CredentialSource;
use crate::error::{PROVIDER_NAME, ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

use super::key::ServiceAccountKey;

/// 距过期不足此时长即重新换取
const REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Serialize)]
struct CreateTokenRequest<'a> {
    jwt: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenResponse {
    iam_token: String,
    expires_at: DateTime<Utc>,
}

struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

enum Inner {
    /// 外部签发的 token，不刷新
    Static(SecretString),
    ServiceAccount {
        key: ServiceAccountKey,
        client: Client,
        endpoint: String,
        cached: RwLock<CachedToken>,
    },
}

/// Yields a valid IAM token for the `Authorization` header.
///
/// Service account tokens are exchanged once at construction and again
/// whenever fewer than five minutes of validity remain.
pub(crate) struct TokenSource {
    inner: Inner,
}

impl TokenSource {
    /// A pre-issued token that is never refreshed.
    pub fn fixed(token: SecretString) -> Self {
        Self {
            inner: Inner::Static(token),
        }
    }

    /// Loads credential material and performs the first exchange.
    ///
    /// A key that cannot be read or parsed fails with
    /// [`ProviderError::Configuration`]; a key IAM rejects fails with
    /// [`ProviderError::InvalidCredentials`].
    pub async fn connect(
        credentials: &CredentialSource,
        client: Client,
        endpoint: &str,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let key = match credentials {
            CredentialSource::IamToken(token) => return Ok(Self::fixed(token.clone())),
            CredentialSource::ServiceAccountKeyFile(path) => ServiceAccountKey::from_file(path)?,
            CredentialSource::ServiceAccountKeyJson(json) => {
                ServiceAccountKey::from_json(json.expose_secret())?
            }
        };

        log::debug!(
            "[{PROVIDER_NAME}] Loaded service account key {} for {}",
            key.key_id,
            key.service_account_id
        );

        let first = exchange(&key, &client, endpoint, cancel).await?;
        Ok(Self {
            inner: Inner::ServiceAccount {
                key,
                client,
                endpoint: endpoint.to_string(),
                cached: RwLock::new(first),
            },
        })
    }

    /// Current token, refreshed first if it is about to expire.
    pub async fn token(&self, cancel: &CancellationToken) -> Result<SecretString> {
        let (key, client, endpoint, cached) = match &self.inner {
            Inner::Static(token) => return Ok(token.clone()),
            Inner::ServiceAccount {
                key,
                client,
                endpoint,
                cached,
            } => (key, client, endpoint, cached),
        };

        {
            let current = cached.read().await;
            if current.is_fresh(Utc::now()) {
                return Ok(current.value.clone());
            }
        }

        let mut current = cached.write().await;
        // 另一个任务可能已经刷新过
        if !current.is_fresh(Utc::now()) {
            log::debug!(
                "[{PROVIDER_NAME}] IAM token expires at {}, refreshing",
                current.expires_at
            );
            *current = exchange(key, client, endpoint, cancel).await?;
        }
        Ok(current.value.clone())
    }
}

/// JWT -> IAM token
async fn exchange(
    key: &ServiceAccountKey,
    client: &Client,
    endpoint: &str,
    cancel: &CancellationToken,
) -> Result<CachedToken> {
    let jwt = key.sign_jwt(endpoint, Utc::now())?;
    let request = client.post(endpoint).json(&CreateTokenRequest { jwt: &jwt });

    let (status, body) =
        HttpUtils::execute_request_cancellable(request, "POST", endpoint, cancel).await?;

    match status {
        200..=299 => {}
        400 | 401 | 403 => {
            log::warn!("[{PROVIDER_NAME}] IAM rejected service account key (HTTP {status})");
            return Err(ProviderError::InvalidCredentials {
                raw_message: Some(truncate_for_log(&body)),
            });
        }
        _ => {
            return Err(ProviderError::Unknown {
                raw_code: Some(status.to_string()),
                raw_message: format!("IAM token exchange failed: {}", truncate_for_log(&body)),
            });
        }
    }

    let response: CreateTokenResponse = HttpUtils::parse_json(&body)?;
    log::debug!(
        "[{PROVIDER_NAME}] Obtained IAM token {} valid until {}",
        mask_secret(&response.iam_token),
        response.expires_at
    );

    Ok(CachedToken {
        value: SecretString::from(response.iam_token),
        expires_at: response.expires_at,
    })
}
