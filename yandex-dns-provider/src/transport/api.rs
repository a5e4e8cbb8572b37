//! `DnsTransport` trait 实现

use std::fmt::Write;

use async_trait::async_trait;

use crate::error::{PROVIDER_NAME, Result};
use crate::traits::{DnsTransport, ErrorContext, Page, ProviderErrorMapper, RawApiError};
use crate::types::{RecordSet, UpsertRequest, Zone};

use super::types::{
    ListDnsZonesResponse, ListRecordSetsResponse, OperationResponse, UpsertRecordSetsRequest,
};
use super::{HttpTransport, MAX_PAGE_SIZE};

/// `pageSize` + 可选 `pageToken`
fn page_query(mut query: String, page_token: &str) -> String {
    if !query.is_empty() {
        query.push('&');
    }
    let _ = write!(query, "pageSize={MAX_PAGE_SIZE}");
    if !page_token.is_empty() {
        let _ = write!(query, "&pageToken={}", urlencoding::encode(page_token));
    }
    query
}

#[async_trait]
impl DnsTransport for HttpTransport {
    async fn list_zones(&self, folder_id: &str, page_token: &str) -> Result<Page<Zone>> {
        let query = page_query(
            format!("folderId={}", urlencoding::encode(folder_id)),
            page_token,
        );

        let response: ListDnsZonesResponse = self
            .get("/zones", &query, ErrorContext::default())
            .await?;

        Ok(Page {
            items: response.dns_zones.into_iter().map(Zone::from).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn list_record_sets(&self, zone_id: &str, page_token: &str) -> Result<Page<RecordSet>> {
        let path = format!("/zones/{}:listRecordSets", urlencoding::encode(zone_id));
        let query = page_query(String::new(), page_token);

        let response: ListRecordSetsResponse = self
            .get(&path, &query, ErrorContext::zone(zone_id))
            .await?;

        Ok(Page {
            items: response
                .record_sets
                .into_iter()
                .map(RecordSet::from)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn upsert_record_sets(&self, request: &UpsertRequest) -> Result<()> {
        let path = format!(
            "/zones/{}:upsertRecordSets",
            urlencoding::encode(&request.zone_id)
        );
        let body = UpsertRecordSetsRequest::from(request);
        let ctx = ErrorContext::zone(&request.zone_id);

        let operation: OperationResponse = self.post(&path, &body, ctx.clone()).await?;

        // 操作已被接受但立即失败
        if let Some(error) = operation.error {
            let code = error.code_name().unwrap_or_default();
            return Err(self.map_error(
                RawApiError::with_code(code, error.message.unwrap_or_default()),
                ctx,
            ));
        }

        log::debug!(
            "[{PROVIDER_NAME}] Upsert operation {} accepted (done={})",
            operation.id,
            operation.done
        );
        Ok(())
    }
}
