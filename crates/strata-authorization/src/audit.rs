//! Audit trail querying
//!
//! Grant and revoke mutations append rows through the store seam as part
//! of the mutation itself; this module provides the read side — a small
//! filter builder over the append-only trail.

use strata_core::StrataResult;
use strata_store::AuditStore;

pub use strata_store::{AuditAction, AuditEntry};

/// Filter criteria for audit trail queries
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    actor_uid: Option<String>,
    action: Option<AuditAction>,
    permission: Option<String>,
    since: Option<i64>,
    until: Option<i64>,
}

impl AuditQuery {
    /// An empty filter matching every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Only rows recorded by this actor uid
    pub fn with_actor_uid(mut self, actor_uid: impl Into<String>) -> Self {
        self.actor_uid = Some(actor_uid.into());
        self
    }

    /// Only rows with this action
    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Only rows concerning this permission
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Only rows at or after this unix timestamp
    pub fn with_since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    /// Only rows at or before this unix timestamp
    pub fn with_until(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }

    fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(ref actor_uid) = self.actor_uid {
            if entry.actor_uid != *actor_uid {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(ref permission) = self.permission {
            if entry.permission != *permission {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.at > until {
                return false;
            }
        }
        true
    }

    /// Run the query against the audit seam, preserving append order
    pub async fn run(&self, store: &dyn AuditStore) -> StrataResult<Vec<AuditEntry>> {
        let entries = store.entries().await?;
        Ok(entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::MemoryStore;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .append(AuditEntry::record(
                "user:alice",
                AuditAction::Grant,
                "driver:kv",
                "user:bob",
                None,
            ))
            .await
            .expect("append");
        store
            .append(AuditEntry::record(
                "user:alice",
                AuditAction::Revoke,
                "driver:kv",
                "user:bob",
                Some("cleanup".into()),
            ))
            .await
            .expect("append");
        store
            .append(AuditEntry::record(
                "user:carol",
                AuditAction::Grant,
                "driver:sql",
                "user:bob",
                None,
            ))
            .await
            .expect("append");
        store
    }

    #[tokio::test]
    async fn empty_query_returns_everything_in_order() {
        let store = seeded().await;
        let rows = AuditQuery::new().run(&store).await.expect("query");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].action, AuditAction::Grant);
        assert_eq!(rows[1].action, AuditAction::Revoke);
    }

    #[tokio::test]
    async fn filters_compose() {
        let store = seeded().await;
        let rows = AuditQuery::new()
            .with_actor_uid("user:alice")
            .with_action(AuditAction::Grant)
            .run(&store)
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].permission, "driver:kv");
    }

    #[tokio::test]
    async fn permission_filter() {
        let store = seeded().await;
        let rows = AuditQuery::new()
            .with_permission("driver:sql")
            .run(&store)
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].actor_uid, "user:carol");
    }

    #[tokio::test]
    async fn time_window_filter() {
        let store = seeded().await;
        let rows = AuditQuery::new()
            .with_since(0)
            .with_until(i64::MAX)
            .run(&store)
            .await
            .expect("query");
        assert_eq!(rows.len(), 3);

        let rows = AuditQuery::new()
            .with_until(0)
            .run(&store)
            .await
            .expect("query");
        assert!(rows.is_empty());
    }
}
