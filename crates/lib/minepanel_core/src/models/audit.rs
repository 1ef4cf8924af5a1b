//! Audit trail models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored, immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub actor_username: String,
    pub actor_role: String,
    pub ip: String,
    pub action: String,
    pub target: Option<String>,
    /// Structured details, serialized as JSON text.
    pub details_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Audit record about to be appended.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub actor_username: String,
    pub actor_role: String,
    pub ip: String,
    pub action: String,
    pub target: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// One page of audit records, newest first.
#[derive(Debug, Clone)]
pub struct AuditPage {
    pub records: Vec<AuditRecord>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl AuditPage {
    /// `ceil(total / limit)`.
    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            return 0;
        }
        (self.total + self.limit - 1) / self.limit
    }
}
