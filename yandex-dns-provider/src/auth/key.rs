//! Service account authorized key 解析与 JWT 签名
//!
//! 参考: <https://yandex.cloud/en/docs/iam/operations/iam-token/create-for-sa>

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// JWT 有效期（IAM 允许的最大值为 1 小时）
const JWT_LIFETIME_SECS: i64 = 3600;

const PEM_BEGIN: &str = "-----BEGIN";

/// 原始 key 文件（`yc iam key create` 输出，兼容 snake_case 与 camelCase）
#[derive(Deserialize)]
struct RawKey {
    id: String,
    #[serde(alias = "serviceAccountId")]
    service_account_id: String,
    #[serde(alias = "privateKey")]
    private_key: String,
}

/// A parsed service account authorized key.
pub(crate) struct ServiceAccountKey {
    pub key_id: String,
    pub service_account_id: String,
    private_key: SecretString,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_id", &self.key_id)
            .field("service_account_id", &self.service_account_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// 读取并解析 key 文件
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProviderError::Configuration {
            detail: format!(
                "failed to read service account key file '{}': {e}",
                path.display()
            ),
        })?;
        Self::from_json(&content)
    }

    /// 解析 key JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawKey = serde_json::from_str(json).map_err(|e| ProviderError::Configuration {
            detail: format!("failed to parse service account key: {e}"),
        })?;

        if raw.id.trim().is_empty() || raw.service_account_id.trim().is_empty() {
            return Err(ProviderError::Configuration {
                detail: "service account key must carry id and service_account_id".to_string(),
            });
        }

        Ok(Self {
            key_id: raw.id,
            service_account_id: raw.service_account_id,
            private_key: SecretString::from(raw.private_key),
        })
    }

    /// 去掉 `PLEASE DO NOT REMOVE THIS LINE!` 前缀，只保留 PEM 部分
    fn encoding_key(&self) -> Result<EncodingKey> {
        let pem = self.private_key.expose_secret();
        let start = pem.find(PEM_BEGIN).ok_or_else(|| ProviderError::Configuration {
            detail: "service account private key is not PEM encoded".to_string(),
        })?;

        EncodingKey::from_rsa_pem(pem[start..].as_bytes()).map_err(|e| {
            ProviderError::Configuration {
                detail: format!("failed to load service account private key: {e}"),
            }
        })
    }

    /// 签发用于换取 IAM token 的 PS256 JWT
    pub fn sign_jwt(&self, audience: &str, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::PS256);
        header.kid = Some(self.key_id.clone());

        let claims = Claims {
            iss: &self.service_account_id,
            aud: audience,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(JWT_LIFETIME_SECS)).timestamp(),
        };

        encode(&header, &claims, &self.encoding_key()?).map_err(|e| {
            ProviderError::Configuration {
                detail: format!("failed to sign JWT: {e}"),
            }
        })
    }
}
