use std::sync::Arc;

use tracing::info;

use models::dict::Dict;

use crate::errors::{EntityKind, StoreError};
use crate::policy::repository::PolicyRepository;

/// Business layer over policy persistence.
///
/// Holds the repository abstraction, never a concrete engine.
pub struct PolicyService {
    repo: Arc<dyn PolicyRepository>,
}

impl PolicyService {
    pub fn new(repo: Arc<dyn PolicyRepository>) -> Self {
        Self { repo }
    }

    /// Create a policy, rejecting duplicate ids up front.
    ///
    /// Only a definite not-found from the lookup means the id is free; any
    /// other lookup failure propagates instead of being read as "does not
    /// exist".
    pub async fn create_policy(&self, policy_id: &str, policy: Dict) -> Result<Dict, StoreError> {
        match self.repo.get_policy(policy_id).await {
            Ok(_) => Err(StoreError::conflict(EntityKind::Policy, format!("duplicate id {policy_id}"))),
            Err(StoreError::NotFound { .. }) => {
                let created = self.repo.create_policy(policy_id, policy).await?;
                info!(policy_id = %policy_id, "policy_created");
                Ok(created)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_policy(&self, policy_id: &str) -> Result<Dict, StoreError> {
        self.repo.get_policy(policy_id).await
    }

    pub async fn list_policy_ids(&self) -> Result<Vec<String>, StoreError> {
        self.repo.list_policy_ids().await
    }

    pub async fn list_policies(&self) -> Result<Vec<Dict>, StoreError> {
        self.repo.list_policies().await
    }

    /// Merge-update; `id` keeps its stored value whatever the caller sends.
    pub async fn update_policy(&self, policy_id: &str, policy: Dict) -> Result<Dict, StoreError> {
        self.repo.update_policy(policy_id, policy).await
    }

    /// Delete requires the record to exist; a missing id is a hard error,
    /// not a no-op.
    pub async fn delete_policy(&self, policy_id: &str) -> Result<(), StoreError> {
        self.repo.delete_policy(policy_id).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::storage::json_kv_store::JsonKvStore;
    use crate::policy::repo::kvs::KvsPolicyRepository;

    fn dict(value: serde_json::Value) -> Dict {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected a JSON object, got {other}"),
        }
    }

    async fn kvs_service() -> (PolicyService, std::path::PathBuf) {
        let tmp = std::env::temp_dir().join(format!("policy_service_{}.json", Uuid::new_v4()));
        let store = JsonKvStore::new(&tmp).await.unwrap();
        (PolicyService::new(Arc::new(KvsPolicyRepository::new(store))), tmp)
    }

    fn policy_fields() -> Dict {
        dict(json!({
            "endpoint_id": "e1",
            "type": "application/json",
            "blob": {"rules": []},
        }))
    }

    #[tokio::test]
    async fn create_conflicts_on_existing_id() {
        let (svc, tmp) = kvs_service().await;

        svc.create_policy("p1", policy_fields()).await.unwrap();
        let err = svc.create_policy("p1", policy_fields()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { kind: EntityKind::Policy, .. }));

        let _ = tokio::fs::remove_file(&tmp).await;
    }

    #[tokio::test]
    async fn delete_then_get_both_fail_typed() {
        let (svc, tmp) = kvs_service().await;

        svc.create_policy("p1", policy_fields()).await.unwrap();
        svc.delete_policy("p1").await.unwrap();
        assert!(matches!(
            svc.get_policy("p1").await.unwrap_err(),
            StoreError::NotFound { kind: EntityKind::Policy, .. }
        ));
        assert!(matches!(
            svc.delete_policy("p1").await.unwrap_err(),
            StoreError::NotFound { kind: EntityKind::Policy, .. }
        ));

        let _ = tokio::fs::remove_file(&tmp).await;
    }

    /// Repository whose lookups always fail with a non-not-found error.
    struct BrokenPolicyRepository;

    #[async_trait]
    impl PolicyRepository for BrokenPolicyRepository {
        async fn create_policy(&self, _policy_id: &str, policy: Dict) -> Result<Dict, StoreError> {
            Ok(policy)
        }
        async fn get_policy(&self, _policy_id: &str) -> Result<Dict, StoreError> {
            Err(StoreError::Db("connection reset".into()))
        }
        async fn list_policy_ids(&self) -> Result<Vec<String>, StoreError> {
            Ok(vec![])
        }
        async fn list_policies(&self) -> Result<Vec<Dict>, StoreError> {
            Ok(vec![])
        }
        async fn update_policy(&self, _policy_id: &str, policy: Dict) -> Result<Dict, StoreError> {
            Ok(policy)
        }
        async fn delete_policy(&self, _policy_id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn lookup_failures_are_not_read_as_free_ids() {
        let svc = PolicyService::new(Arc::new(BrokenPolicyRepository));
        // a backend failure during the existence check must propagate, not
        // fall through to create
        let err = svc.create_policy("p1", policy_fields()).await.unwrap_err();
        assert!(matches!(err, StoreError::Db(_)));
    }
}
