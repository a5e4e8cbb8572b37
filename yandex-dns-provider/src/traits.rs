use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{RecordSet, UpsertRequest, Zone};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// gRPC 状态名（`NOT_FOUND`）或 HTTP 状态码（`"404"`）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Zone ID（用于 `ZoneNotFound`）
    pub zone_id: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone_id: &str) -> Self {
        Self {
            zone_id: Some(zone_id.to_string()),
        }
    }
}

/// 错误映射 Trait（内部使用）
/// 将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// One page of a cursor-paginated listing.
///
/// An empty `next_page_token` means there are no further pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page<T> {
    /// Items of this page, in provider order.
    pub items: Vec<T>,
    /// Opaque continuation cursor.
    pub next_page_token: String,
}

impl<T> Page<T> {
    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: String::new(),
        }
    }

    /// A page followed by `next_page_token`.
    pub fn with_next(items: Vec<T>, next_page_token: impl Into<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.into(),
        }
    }
}

/// Authorized remote procedure caller for the DNS API.
///
/// [`YandexDnsClient`](crate::YandexDnsClient) drives pagination and bucket
/// validation on top of this; implementations only move one page or one
/// mutation over the wire. Implementations must be safe for concurrent use.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Fetches one page of zones in `folder_id`. An empty `page_token` requests the first page.
    async fn list_zones(&self, folder_id: &str, page_token: &str) -> Result<Page<Zone>>;

    /// Fetches one page of record sets in `zone_id`.
    async fn list_record_sets(&self, zone_id: &str, page_token: &str) -> Result<Page<RecordSet>>;

    /// Submits all three buckets of `request` in one call.
    async fn upsert_record_sets(&self, request: &UpsertRequest) -> Result<()>;
}
