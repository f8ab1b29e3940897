use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde_json::Value;
use tracing::info;

use models::dict::Dict;
use models::policy;

use crate::errors::{db_err, write_err, EntityKind, StoreError};
use crate::policy::repository::PolicyRepository;

/// SeaORM-backed policy repository.
///
/// One transaction per mutating call; uniqueness violations on create and
/// update are translated into typed conflicts at the call site.
pub struct SeaOrmPolicyRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPolicyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Bring the schema up to date. Administrative entry point.
    pub async fn db_sync(&self) -> Result<(), StoreError> {
        migration::Migrator::up(&self.db, None).await.map_err(db_err)
    }
}

#[async_trait::async_trait]
impl PolicyRepository for SeaOrmPolicyRepository {
    async fn create_policy(&self, policy_id: &str, mut policy: Dict) -> Result<Dict, StoreError> {
        policy.insert("id".to_owned(), Value::String(policy_id.to_owned()));
        let model = policy::Model::from_dict(policy)?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let am = policy::ActiveModel {
            id: Set(model.id),
            endpoint_id: Set(model.endpoint_id),
            r#type: Set(model.r#type),
            blob: Set(model.blob),
            extra: Set(model.extra),
        };
        let created = am.insert(&txn).await.map_err(|e| write_err(EntityKind::Policy, e))?;
        txn.commit().await.map_err(db_err)?;
        info!(policy_id = %created.id, "policy_created");
        Ok(created.to_dict())
    }

    async fn get_policy(&self, policy_id: &str) -> Result<Dict, StoreError> {
        let found = policy::Entity::find_by_id(policy_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Policy, policy_id))?;
        Ok(found.to_dict())
    }

    async fn list_policy_ids(&self) -> Result<Vec<String>, StoreError> {
        let policies = policy::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(policies.into_iter().map(|p| p.id).collect())
    }

    async fn list_policies(&self) -> Result<Vec<Dict>, StoreError> {
        let policies = policy::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(policies.iter().map(policy::Model::to_dict).collect())
    }

    async fn update_policy(&self, policy_id: &str, policy: Dict) -> Result<Dict, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = policy::Entity::find_by_id(policy_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Policy, policy_id))?;
        let mut merged = existing.to_dict();
        for (k, v) in policy {
            merged.insert(k, v);
        }
        merged.insert("id".to_owned(), Value::String(existing.id.clone()));
        let model = policy::Model::from_dict(merged)?;
        let mut am: policy::ActiveModel = existing.into();
        am.endpoint_id = Set(model.endpoint_id);
        am.r#type = Set(model.r#type);
        am.blob = Set(model.blob);
        am.extra = Set(model.extra);
        let updated = am.update(&txn).await.map_err(|e| write_err(EntityKind::Policy, e))?;
        txn.commit().await.map_err(db_err)?;
        Ok(updated.to_dict())
    }

    async fn delete_policy(&self, policy_id: &str) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let res = policy::Entity::delete_by_id(policy_id).exec(&txn).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(StoreError::not_found(EntityKind::Policy, policy_id));
        }
        txn.commit().await.map_err(db_err)?;
        info!(policy_id = %policy_id, "policy_deleted");
        Ok(())
    }
}
