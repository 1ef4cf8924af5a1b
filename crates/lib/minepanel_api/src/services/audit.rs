//! Audit recorder: best-effort append of one record per sensitive action.
//!
//! A failed write is logged and swallowed: the primary action is never
//! failed because the audit trail could not be written.

use minepanel_core::audit::{ANONYMOUS_ACTOR, AuditAction, UNKNOWN_ROLE};
use minepanel_core::models::auth::Identity;
use minepanel_core::models::audit::NewAuditRecord;
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// One audited action, before actor and origin are attached.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub target: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            target: None,
            details: None,
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Writes audit records to the audit store.
#[derive(Clone, Debug)]
pub struct AuditRecorder {
    pool: SqlitePool,
}

impl AuditRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one record. `actor` is `None` before authentication succeeds,
    /// in which case the record is attributed to `anonymous` / `UNKNOWN`.
    pub async fn record(&self, actor: Option<&Identity>, ip: &str, event: AuditEvent) {
        let record = build_record(actor, ip, event);

        match minepanel_core::audit::queries::insert_audit_record(&self.pool, &record).await {
            Ok(id) => debug!(id, action = %record.action, actor = %record.actor_username, "audit recorded"),
            Err(e) => warn!(
                action = %record.action,
                actor = %record.actor_username,
                "failed to write audit record: {e}"
            ),
        }
    }
}

fn build_record(actor: Option<&Identity>, ip: &str, event: AuditEvent) -> NewAuditRecord {
    let (actor_username, actor_role) = match actor {
        Some(identity) => (identity.username.clone(), identity.role.as_str().to_string()),
        None => (ANONYMOUS_ACTOR.to_string(), UNKNOWN_ROLE.to_string()),
    };
    NewAuditRecord {
        actor_username,
        actor_role,
        ip: ip.to_string(),
        action: event.action.as_str().to_string(),
        target: event.target,
        details: event.details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minepanel_core::audit::PageRequest;
    use minepanel_core::audit::queries::list_audit_records;
    use minepanel_core::auth::Role;

    #[test]
    fn anonymous_actor_sentinel() {
        let record = build_record(None, "1.2.3.4", AuditEvent::new(AuditAction::LoginFailed));
        assert_eq!(record.actor_username, "anonymous");
        assert_eq!(record.actor_role, "UNKNOWN");
        assert_eq!(record.action, "LOGIN_FAILED");
    }

    #[test]
    fn identity_is_captured() {
        let admin = Identity {
            id: 1,
            username: "admin".into(),
            role: Role::Admin,
        };
        let record = build_record(
            Some(&admin),
            "1.2.3.4",
            AuditEvent::new(AuditAction::DeleteUser).target("griefer"),
        );
        assert_eq!(record.actor_username, "admin");
        assert_eq!(record.actor_role, "ADMIN");
        assert_eq!(record.target.as_deref(), Some("griefer"));
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        // No migrations: the table does not exist, so the insert fails.
        let pool = minepanel_core::db::connect_ephemeral().await.unwrap();
        let recorder = AuditRecorder::new(pool);
        recorder
            .record(None, "1.2.3.4", AuditEvent::new(AuditAction::Login))
            .await;
    }

    #[tokio::test]
    async fn record_is_persisted() {
        let pool = minepanel_core::db::connect_ephemeral().await.unwrap();
        minepanel_core::migrate::migrate(&pool).await.unwrap();
        let recorder = AuditRecorder::new(pool.clone());
        recorder
            .record(
                None,
                "1.2.3.4",
                AuditEvent::new(AuditAction::CommandDenied)
                    .details(serde_json::json!({"command": "op me"})),
            )
            .await;

        let page = list_audit_records(&pool, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].action, "COMMAND_DENIED");
        assert_eq!(page.records[0].ip, "1.2.3.4");
    }
}
