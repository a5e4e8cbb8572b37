//! Yandex Cloud HTTP 请求方法

use reqwest::RequestBuilder;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::{PROVIDER_NAME, ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::HttpTransport;
use super::types::ErrorResponse;

impl HttpTransport {
    // ==================== 辅助方法 ====================

    /// 统一处理响应错误
    fn handle_response_error(
        &self,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        // 尝试解析结构化错误
        if let Ok(error) = serde_json::from_str::<ErrorResponse>(response_text)
            && let Some(code) = error.code_name()
        {
            return Err(self.map_error(
                RawApiError::with_code(code, error.message.unwrap_or_default()),
                ctx,
            ));
        }

        // 回退到 HTTP 状态码
        Err(self.map_error(
            RawApiError::with_code(
                status.to_string(),
                format!("HTTP {status}: {}", truncate_for_log(response_text)),
            ),
            ctx,
        ))
    }

    /// 附加 `Authorization: Bearer <IAM token>`
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.tokens.token(&self.cancel).await?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{path}", self.endpoint)
        } else {
            format!("{}{path}?{query}", self.endpoint)
        }
    }

    // ==================== 公开 API 方法 ====================

    /// 执行 GET 请求（只读，按 `max_read_retries` 重试）
    pub(crate) async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &str,
        ctx: ErrorContext,
    ) -> Result<T> {
        let url = self.url(path, query);
        let request = self.authorize(self.client.get(&url)).await?;

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            "GET",
            &url,
            self.max_read_retries,
            &self.cancel,
        )
        .await?;

        self.handle_response_error(status, &response_text, ctx)?;
        HttpUtils::parse_json(&response_text)
    }

    /// 执行 POST 请求（变更操作，从不重试）
    pub(crate) async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        let payload =
            serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                detail: e.to_string(),
            })?;

        log::debug!(
            "[{PROVIDER_NAME}] Request Body: {}",
            truncate_for_log(&payload)
        );

        let url = self.url(path, "");
        let request = self
            .authorize(self.client.post(&url))
            .await?
            .header("Content-Type", "application/json")
            .body(payload);

        let (status, response_text) =
            HttpUtils::execute_request_cancellable(request, "POST", &url, &self.cancel).await?;

        self.handle_response_error(status, &response_text, ctx)?;
        HttpUtils::parse_json(&response_text)
    }
}
