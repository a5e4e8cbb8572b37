//! Yandex Cloud DNS REST API type definition
//!
//! proto3 JSON mapping: camelCase field names, int64 as string.

use serde::{Deserialize, Serialize};

use crate::types::{RecordSet, Zone};
use crate::utils::int64;

// ============ Zones ============

/// Response payload for `DnsZoneService.List`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDnsZonesResponse {
    #[serde(default)]
    pub dns_zones: Vec<DnsZone>,
    #[serde(default)]
    pub next_page_token: String,
}

/// Zone item. Visibility blocks are only checked for presence.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZone {
    pub id: String,
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub private_visibility: Option<serde_json::Value>,
}

impl From<DnsZone> for Zone {
    fn from(z: DnsZone) -> Self {
        Self {
            id: z.id,
            name: z.zone,
            is_private: z.private_visibility.is_some(),
            folder_id: z.folder_id,
            description: Some(z.description).filter(|d| !d.is_empty()),
        }
    }
}

// ============ Record sets ============

/// Response payload for `DnsZoneService.ListRecordSets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordSetsResponse {
    #[serde(default)]
    pub record_sets: Vec<DnsRecordSet>,
    #[serde(default)]
    pub next_page_token: String,
}

/// Record set as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(with = "int64", default)]
    pub ttl: u64,
    #[serde(default)]
    pub data: Vec<String>,
}

impl From<DnsRecordSet> for RecordSet {
    fn from(r: DnsRecordSet) -> Self {
        Self {
            name: r.name,
            record_type: r.record_type,
            ttl: r.ttl,
            data: r.data,
        }
    }
}

impl From<&RecordSet> for DnsRecordSet {
    fn from(r: &RecordSet) -> Self {
        Self {
            name: r.name.clone(),
            record_type: r.record_type.clone(),
            ttl: r.ttl,
            data: r.data.clone(),
        }
    }
}

// ============ Upsert ============

/// Request body for `DnsZoneService.UpsertRecordSets`.
///
/// All three buckets are always serialized, even when empty.
#[derive(Debug, Serialize)]
pub struct UpsertRecordSetsRequest {
    pub deletions: Vec<DnsRecordSet>,
    pub replacements: Vec<DnsRecordSet>,
    pub merges: Vec<DnsRecordSet>,
}

impl UpsertRecordSetsRequest {
    fn bucket(record_sets: &[RecordSet]) -> Vec<DnsRecordSet> {
        record_sets.iter().map(DnsRecordSet::from).collect()
    }
}

impl From<&crate::types::UpsertRequest> for UpsertRecordSetsRequest {
    fn from(req: &crate::types::UpsertRequest) -> Self {
        Self {
            deletions: Self::bucket(&req.deletions),
            replacements: Self::bucket(&req.replacements),
            merges: Self::bucket(&req.merges),
        }
    }
}

/// Long-running operation returned by mutating calls.
#[derive(Debug, Deserialize)]
pub struct OperationResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<ErrorResponse>,
}

// ============ Errors ============

/// Error payload (`google.rpc.Status`). `code` is numeric from the REST
/// gateway but may arrive as a status name.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl ErrorResponse {
    /// gRPC status name for `code`, or the raw value when unrecognized.
    pub fn code_name(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::Number(n) => Some(
                n.as_u64()
                    .and_then(grpc_status_name)
                    .map_or_else(|| n.to_string(), str::to_string),
            ),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// google.rpc.Code -> 名称
fn grpc_status_name(code: u64) -> Option<&'static str> {
    Some(match code {
        1 => "CANCELLED",
        2 => "UNKNOWN",
        3 => "INVALID_ARGUMENT",
        4 => "DEADLINE_EXCEEDED",
        5 => "NOT_FOUND",
        6 => "ALREADY_EXISTS",
        7 => "PERMISSION_DENIED",
        8 => "RESOURCE_EXHAUSTED",
        9 => "FAILED_PRECONDITION",
        10 => "ABORTED",
        11 => "OUT_OF_RANGE",
        12 => "UNIMPLEMENTED",
        13 => "INTERNAL",
        14 => "UNAVAILABLE",
        15 => "DATA_LOSS",
        16 => "UNAUTHENTICATED",
        _ => return None,
    })
}
