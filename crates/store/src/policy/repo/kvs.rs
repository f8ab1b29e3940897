use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use models::dict::Dict;

use crate::errors::{EntityKind, StoreError};
use crate::policy::repository::PolicyRepository;
use crate::storage::json_kv_store::JsonKvStore;

/// Key under which the set of known policy ids is stored.
const POLICY_LIST_KEY: &str = "policy_list";

fn policy_key(policy_id: &str) -> String {
    format!("policy-{policy_id}")
}

/// Key-value-backed policy repository.
///
/// Each policy record lives under `policy-<id>`; a separate `policy_list`
/// record holds the id set that the list operations walk with point lookups.
/// The record and the index are written one after another with no transaction
/// spanning both, so a crash between the two writes leaves an orphaned record
/// or a stale index entry. Reconciling the index against the present record
/// keys is an operational task, not done at runtime. Callers that need strict
/// consistency should use the SQL repository.
pub struct KvsPolicyRepository {
    db: Arc<JsonKvStore>,
}

impl KvsPolicyRepository {
    pub fn new(db: Arc<JsonKvStore>) -> Self {
        Self { db }
    }

    async fn read_index(&self) -> BTreeSet<String> {
        match self.db.get(POLICY_LIST_KEY).await {
            Some(Value::Array(ids)) => ids
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    async fn write_index(&self, ids: &BTreeSet<String>) -> Result<(), StoreError> {
        let ids: Vec<Value> = ids.iter().cloned().map(Value::String).collect();
        self.db.set(POLICY_LIST_KEY, Value::Array(ids)).await
    }

    fn as_dict(policy_id: &str, value: Value) -> Result<Dict, StoreError> {
        match value {
            Value::Object(dict) => Ok(dict),
            _ => Err(StoreError::Validation(format!(
                "stored policy {policy_id} is not an object"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl PolicyRepository for KvsPolicyRepository {
    async fn create_policy(&self, policy_id: &str, mut policy: Dict) -> Result<Dict, StoreError> {
        if self.db.get(&policy_key(policy_id)).await.is_some() {
            return Err(StoreError::conflict(EntityKind::Policy, format!("duplicate id {policy_id}")));
        }
        policy.insert("id".to_owned(), Value::String(policy_id.to_owned()));
        self.db.set(&policy_key(policy_id), Value::Object(policy.clone())).await?;
        // index update is a separate write; a crash right here orphans the
        // record from list_policies
        let mut ids = self.read_index().await;
        ids.insert(policy_id.to_owned());
        self.write_index(&ids).await?;
        debug!(policy_id = %policy_id, "policy_created");
        Ok(policy)
    }

    async fn get_policy(&self, policy_id: &str) -> Result<Dict, StoreError> {
        match self.db.get(&policy_key(policy_id)).await {
            Some(value) => Self::as_dict(policy_id, value),
            None => Err(StoreError::not_found(EntityKind::Policy, policy_id)),
        }
    }

    async fn list_policy_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_index().await.into_iter().collect())
    }

    async fn list_policies(&self) -> Result<Vec<Dict>, StoreError> {
        let mut policies = Vec::new();
        for policy_id in self.read_index().await {
            policies.push(self.get_policy(&policy_id).await?);
        }
        Ok(policies)
    }

    async fn update_policy(&self, policy_id: &str, policy: Dict) -> Result<Dict, StoreError> {
        let mut merged = self.get_policy(policy_id).await?;
        for (k, v) in policy {
            merged.insert(k, v);
        }
        merged.insert("id".to_owned(), Value::String(policy_id.to_owned()));
        // membership never changes on update, the index is left alone
        self.db.set(&policy_key(policy_id), Value::Object(merged.clone())).await?;
        Ok(merged)
    }

    async fn delete_policy(&self, policy_id: &str) -> Result<(), StoreError> {
        self.get_policy(policy_id).await?;
        self.db.delete(&policy_key(policy_id)).await?;
        let mut ids = self.read_index().await;
        ids.remove(policy_id);
        self.write_index(&ids).await?;
        debug!(policy_id = %policy_id, "policy_deleted");
        Ok(())
    }
}
