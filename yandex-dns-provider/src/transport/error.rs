//! Yandex Cloud 错误映射
//!
//! 参考: <https://yandex.cloud/en/docs/api-design-guide/concepts/errors>
//!
//! REST 网关返回 `google.rpc.Status`，`code` 为 gRPC 状态码。
//! 无法解析响应体时回退为 HTTP 状态码（`"401"`, `"404"`, ...）。

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::HttpTransport;

impl ProviderErrorMapper for HttpTransport {
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // ============ 认证错误 ============
            Some("UNAUTHENTICATED" | "401") => ProviderError::InvalidCredentials {
                raw_message: Some(raw.message),
            },

            // ============ 权限不足 ============
            Some("PERMISSION_DENIED" | "403") => ProviderError::PermissionDenied {
                raw_message: Some(raw.message),
            },

            // ============ Zone 不存在 ============
            Some("NOT_FOUND" | "404") if context.zone_id.is_some() => {
                ProviderError::ZoneNotFound {
                    zone_id: context.zone_id.unwrap_or_default(),
                    raw_message: Some(raw.message),
                }
            }

            // ============ 参数无效 ============
            Some("INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" | "400") => {
                ProviderError::InvalidParameter {
                    param: "request".to_string(),
                    detail: raw.message,
                }
            }

            // ============ 配额/频率限制 ============
            Some("RESOURCE_EXHAUSTED") => {
                if raw.message.to_ascii_lowercase().contains("quota") {
                    ProviderError::QuotaExceeded {
                        raw_message: Some(raw.message),
                    }
                } else {
                    ProviderError::RateLimited {
                        retry_after: None,
                        raw_message: Some(raw.message),
                    }
                }
            }

            // ============ 网络/超时 ============
            Some("DEADLINE_EXCEEDED") => ProviderError::Timeout {
                detail: raw.message,
            },
            Some("UNAVAILABLE" | "500" | "503") => ProviderError::NetworkError {
                detail: raw.message,
            },

            Some("CANCELLED") => ProviderError::Cancelled,

            // ============ 未知错误 ============
            _ => self.unknown_error(raw),
        }
    }
}
