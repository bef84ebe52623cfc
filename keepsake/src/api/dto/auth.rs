//! Curator session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::CuratorSession;

/// Request body for `POST /api/auth/session`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// A password from the server-side curator allowlist.
    pub password: String,
}

/// Response for `POST /api/auth/session`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Bearer token for subsequent curator requests.
    pub token: String,
    #[schema(value_type = String)]
    pub expires_at: DateTime<Utc>,
}

impl From<CuratorSession> for SessionResponse {
    fn from(session: CuratorSession) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
        }
    }
}
