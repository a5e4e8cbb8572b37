//! Reconciliation-facing DNS client.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ClientResult, Operation, PROVIDER_NAME, WithOperation};
use crate::pagination::collect_all;
use crate::traits::DnsTransport;
use crate::transport::HttpTransport;
use crate::types::{RecordSet, UpsertRequest, Zone};

/// Lists zones and record sets of one folder and applies batched upserts.
///
/// The client is an explicit, caller-owned handle holding only the
/// transport and the folder it was bound to. Cloning is cheap and clones
/// share the transport.
///
/// # Concurrency
///
/// Calls for different zones may run concurrently. Concurrent upserts to the
/// *same* zone are not ordered or isolated by the client; callers that need
/// that must serialize them.
///
/// # Cancellation
///
/// Dropping a returned future abandons the call. For an explicit
/// [`ProviderError::Cancelled`](crate::ProviderError::Cancelled) result, build
/// the client with [`connect_with_cancellation`](Self::connect_with_cancellation).
/// A cancelled listing never yields partial data.
#[derive(Clone)]
pub struct YandexDnsClient {
    transport: Arc<dyn DnsTransport>,
    folder_id: String,
}

impl std::fmt::Debug for YandexDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexDnsClient")
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}

impl YandexDnsClient {
    /// Builds a client over the REST API.
    ///
    /// Fails with the `failed to build client` prefix when the configuration
    /// is invalid (checked before any I/O), when the key cannot be loaded, or
    /// when IAM rejects it.
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        Self::connect_with_cancellation(config, CancellationToken::new()).await
    }

    /// Same as [`connect`](Self::connect); all calls fail with
    /// [`ProviderError::Cancelled`](crate::ProviderError::Cancelled) once
    /// `cancel` fires.
    pub async fn connect_with_cancellation(
        config: &ClientConfig,
        cancel: CancellationToken,
    ) -> ClientResult<Self> {
        let transport = HttpTransport::connect_with_cancellation(config, cancel)
            .await
            .during(Operation::Connect)?;
        Ok(Self::with_transport(
            config.folder_id.clone(),
            Arc::new(transport),
        ))
    }

    /// Builds a client over any [`DnsTransport`].
    pub fn with_transport(folder_id: impl Into<String>, transport: Arc<dyn DnsTransport>) -> Self {
        Self {
            transport,
            folder_id: folder_id.into(),
        }
    }

    /// The folder whose zones [`list_zones`](Self::list_zones) enumerates.
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    /// Every zone in the bound folder, in provider order.
    ///
    /// Pages are fetched until the provider returns an empty cursor. If any
    /// page fails the whole call fails and nothing is returned.
    pub async fn list_zones(&self) -> ClientResult<Vec<Zone>> {
        collect_all("zones", move |page_token| async move {
            self.transport
                .list_zones(&self.folder_id, &page_token)
                .await
        })
        .await
        .during(Operation::ListZones)
    }

    /// Every record set in `zone_id`, in provider order.
    ///
    /// Follows the listing cursor like [`list_zones`](Self::list_zones), with
    /// the same all-or-nothing failure.
    pub async fn list_record_sets(&self, zone_id: &str) -> ClientResult<Vec<RecordSet>> {
        collect_all("record sets", move |page_token| async move {
            self.transport.list_record_sets(zone_id, &page_token).await
        })
        .await
        .during(Operation::ListRecordSets)
    }

    /// Sends deletions, replacements and merges for one zone in a single call.
    ///
    /// An all-empty request is still sent. A request naming the same
    /// `(name, type)` in two buckets is rejected before anything is sent.
    /// On error the mutation state of the zone is unknown.
    pub async fn upsert_record_sets(&self, request: &UpsertRequest) -> ClientResult<()> {
        request
            .check_disjoint()
            .during(Operation::UpsertRecordSets)?;

        log::debug!(
            "[{PROVIDER_NAME}] Upserting zone {}: {} deletion(s), {} replacement(s), {} merge(s)",
            request.zone_id,
            request.deletions.len(),
            request.replacements.len(),
            request.merges.len()
        );

        self.transport
            .upsert_record_sets(request)
            .await
            .during(Operation::UpsertRecordSets)
    }
}
