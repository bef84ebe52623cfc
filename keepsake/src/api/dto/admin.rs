//! Admin DTOs for the curator-gated routes.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/admin/bulk-memories`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSeedRequest {
    /// Number of test memories to create (default 25, clamped to 1..=500).
    pub count: Option<u32>,
}

/// Response for `POST /api/admin/bulk-memories`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSeedResponse {
    pub created: u32,
    pub ids: Vec<String>,
}

/// Response for `DELETE /api/admin/bulk-memories`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPurgeResponse {
    /// Seeded memories hard-deleted (document and index item).
    pub deleted: u64,
}

/// Response for `POST /api/admin/index:repair`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexRepairResponse {
    /// Index items examined in this pass.
    pub scanned: u64,
    /// Orphaned index items removed.
    pub repaired: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_request_count_is_optional() {
        let req: BulkSeedRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(req.count.is_none());
    }

    #[test]
    fn repair_response_serializes_camel_case() {
        let resp = IndexRepairResponse {
            scanned: 10,
            repaired: 2,
        };
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["scanned"], 10);
        assert_eq!(json["repaired"], 2);
    }
}
