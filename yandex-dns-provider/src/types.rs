use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

// ============ Zone ============

/// A DNS zone visible in the client's folder.
///
/// Zones are only observed: the client never creates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Provider-assigned zone ID, stable for the zone's lifetime.
    pub id: String,
    /// DNS zone name, e.g. `example.com.`.
    ///
    /// Not unique: a public and a private zone may share a name.
    pub name: String,
    /// `true` when the provider reports a private visibility block for the zone.
    pub is_private: bool,
    /// Folder the zone belongs to.
    pub folder_id: String,
    /// Free-form description, if one is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============ Record Set ============

/// One record set: every RDATA value sharing a `(name, type)` pair in a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordSet {
    /// Record name, in the provider's convention (usually fully qualified).
    pub name: String,
    /// RR type token: `A`, `AAAA`, `CNAME`, `TXT`, ...
    #[serde(rename = "type")]
    pub record_type: String,
    /// Time to live in seconds.
    pub ttl: u64,
    /// RDATA values. Order is kept exactly as given; never sorted or deduplicated.
    pub data: Vec<String>,
}

impl RecordSet {
    /// Creates a record set.
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u64,
        data: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            data: data.into_iter().map(Into::into).collect(),
        }
    }

    /// The `(name, type)` pair identifying this record set within its zone.
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.record_type)
    }
}

// ============ Upsert ============

/// One reconciliation pass against a single zone.
///
/// Deletions, replacements and merges are sent together in a single call.
/// The buckets must be disjoint by `(name, type)`; a request that violates
/// this is rejected before it is sent (see [`UpsertRequest::check_disjoint`]).
///
/// - **deletions**: remove the record set with the same `(name, type)`.
///   `ttl` and `data` only identify the target.
/// - **replacements**: overwrite `ttl` and `data` of the record set, or create it.
/// - **merges**: add `data` to the existing record set, or create it with exactly `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    /// Zone to mutate.
    pub zone_id: String,
    /// Record sets to remove.
    pub deletions: Vec<RecordSet>,
    /// Record sets to create or fully overwrite.
    pub replacements: Vec<RecordSet>,
    /// Record sets whose data is unioned into the existing set.
    pub merges: Vec<RecordSet>,
}

impl UpsertRequest {
    /// Creates an empty request for `zone_id`.
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            ..Default::default()
        }
    }

    /// Appends a record set to the deletions bucket.
    #[must_use]
    pub fn delete(mut self, record_set: RecordSet) -> Self {
        self.deletions.push(record_set);
        self
    }

    /// Appends a record set to the replacements bucket.
    #[must_use]
    pub fn replace(mut self, record_set: RecordSet) -> Self {
        self.replacements.push(record_set);
        self
    }

    /// Appends a record set to the merges bucket.
    #[must_use]
    pub fn merge(mut self, record_set: RecordSet) -> Self {
        self.merges.push(record_set);
        self
    }

    /// `true` when all three buckets are empty.
    ///
    /// An empty request is still a valid request and is still sent.
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.replacements.is_empty() && self.merges.is_empty()
    }

    /// Total number of record sets across the three buckets.
    pub fn len(&self) -> usize {
        self.deletions.len() + self.replacements.len() + self.merges.len()
    }

    /// Verifies that no `(name, type)` appears in more than one bucket.
    ///
    /// Repeats inside a single bucket are left alone.
    pub fn check_disjoint(&self) -> Result<()> {
        let buckets = [
            ("deletions", &self.deletions),
            ("replacements", &self.replacements),
            ("merges", &self.merges),
        ];

        let mut seen: HashMap<(&str, &str), &str> = HashMap::with_capacity(self.len());
        for (bucket, record_sets) in buckets {
            for record_set in record_sets {
                match seen.get(&record_set.key()) {
                    Some(&first) if first != bucket => {
                        return Err(ProviderError::ConflictingBuckets {
                            name: record_set.name.clone(),
                            record_type: record_set.record_type.clone(),
                            buckets: format!("{first}, {bucket}"),
                        });
                    }
                    Some(_) => {}
                    None => {
                        seen.insert(record_set.key(), bucket);
                    }
                }
            }
        }

        Ok(())
    }
}
