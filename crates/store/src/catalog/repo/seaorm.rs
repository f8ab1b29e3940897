use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde_json::Value;
use tracing::info;

use models::dict::Dict;
use models::{endpoint, service};

use crate::catalog::repository::CatalogRepository;
use crate::errors::{db_err, write_err, EntityKind, StoreError};

/// SeaORM-backed catalog repository.
///
/// Each mutating call runs in its own transaction; dropping the handle on an
/// error path rolls it back, so no partial row state is ever visible. Reads
/// and listings run outside any explicit transaction.
pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Bring the schema up to date. Administrative entry point, not part of
    /// the runtime CRUD surface.
    pub async fn db_sync(&self) -> Result<(), StoreError> {
        migration::Migrator::up(&self.db, None).await.map_err(db_err)
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn create_service(&self, service_id: &str, mut service: Dict) -> Result<Dict, StoreError> {
        service.insert("id".to_owned(), Value::String(service_id.to_owned()));
        let model = service::Model::from_dict(service)?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let am = service::ActiveModel {
            id: Set(model.id),
            r#type: Set(model.r#type),
            extra: Set(model.extra),
        };
        let created = am.insert(&txn).await.map_err(|e| write_err(EntityKind::Service, e))?;
        txn.commit().await.map_err(db_err)?;
        info!(service_id = %created.id, "service_created");
        Ok(created.to_dict())
    }

    async fn get_service(&self, service_id: &str) -> Result<Dict, StoreError> {
        let found = service::Entity::find_by_id(service_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Service, service_id))?;
        Ok(found.to_dict())
    }

    async fn list_service_ids(&self) -> Result<Vec<String>, StoreError> {
        let services = service::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(services.into_iter().map(|s| s.id).collect())
    }

    async fn list_services(&self) -> Result<Vec<Dict>, StoreError> {
        let services = service::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(services.iter().map(service::Model::to_dict).collect())
    }

    async fn update_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = service::Entity::find_by_id(service_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Service, service_id))?;
        let mut merged = existing.to_dict();
        for (k, v) in service {
            merged.insert(k, v);
        }
        // identity is immutable once created
        merged.insert("id".to_owned(), Value::String(existing.id.clone()));
        let model = service::Model::from_dict(merged)?;
        let mut am: service::ActiveModel = existing.into();
        am.r#type = Set(model.r#type);
        am.extra = Set(model.extra);
        let updated = am.update(&txn).await.map_err(|e| write_err(EntityKind::Service, e))?;
        txn.commit().await.map_err(db_err)?;
        Ok(updated.to_dict())
    }

    async fn delete_service(&self, service_id: &str) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let res = service::Entity::delete_by_id(service_id).exec(&txn).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(StoreError::not_found(EntityKind::Service, service_id));
        }
        txn.commit().await.map_err(db_err)?;
        info!(service_id = %service_id, "service_deleted");
        Ok(())
    }

    async fn create_endpoint(&self, endpoint_id: &str, mut endpoint: Dict) -> Result<Dict, StoreError> {
        endpoint.insert("id".to_owned(), Value::String(endpoint_id.to_owned()));
        let model = endpoint::Model::from_dict(endpoint)?;
        // Pre-flight existence check for the referenced service, before the
        // write transaction opens. The foreign key still guards the race
        // against a concurrent service delete.
        self.get_service(&model.service_id).await?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let am = endpoint::ActiveModel {
            id: Set(model.id),
            region: Set(model.region),
            service_id: Set(model.service_id),
            extra: Set(model.extra),
        };
        let created = am.insert(&txn).await.map_err(|e| write_err(EntityKind::Endpoint, e))?;
        txn.commit().await.map_err(db_err)?;
        info!(endpoint_id = %created.id, service_id = %created.service_id, "endpoint_created");
        Ok(created.to_dict())
    }

    async fn get_endpoint(&self, endpoint_id: &str) -> Result<Dict, StoreError> {
        let found = endpoint::Entity::find_by_id(endpoint_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Endpoint, endpoint_id))?;
        Ok(found.to_dict())
    }

    async fn list_endpoint_ids(&self) -> Result<Vec<String>, StoreError> {
        let endpoints = endpoint::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(endpoints.into_iter().map(|e| e.id).collect())
    }

    async fn list_endpoints(&self) -> Result<Vec<Dict>, StoreError> {
        let endpoints = endpoint::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(endpoints.iter().map(endpoint::Model::to_dict).collect())
    }

    async fn update_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = endpoint::Entity::find_by_id(endpoint_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Endpoint, endpoint_id))?;
        let mut merged = existing.to_dict();
        for (k, v) in endpoint {
            merged.insert(k, v);
        }
        merged.insert("id".to_owned(), Value::String(existing.id.clone()));
        let model = endpoint::Model::from_dict(merged)?;
        let mut am: endpoint::ActiveModel = existing.into();
        am.region = Set(model.region);
        am.service_id = Set(model.service_id);
        am.extra = Set(model.extra);
        let updated = am.update(&txn).await.map_err(|e| write_err(EntityKind::Endpoint, e))?;
        txn.commit().await.map_err(db_err)?;
        Ok(updated.to_dict())
    }

    async fn delete_endpoint(&self, endpoint_id: &str) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let res = endpoint::Entity::delete_by_id(endpoint_id).exec(&txn).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(StoreError::not_found(EntityKind::Endpoint, endpoint_id));
        }
        txn.commit().await.map_err(db_err)?;
        info!(endpoint_id = %endpoint_id, "endpoint_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::test_support;

    fn dict(value: serde_json::Value) -> Dict {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected a JSON object, got {other}"),
        }
    }

    #[tokio::test]
    async fn service_crud_against_sql() -> Result<(), anyhow::Error> {
        let db = match test_support::try_db().await {
            Some(db) => db,
            None => return Ok(()),
        };
        let repo = SeaOrmCatalogRepository::new(db);
        // idempotent; the schema is already current after try_db
        repo.db_sync().await?;

        let service_id = format!("svc-{}", Uuid::new_v4());
        let created = repo
            .create_service(&service_id, dict(json!({"type": "compute", "name": "Nova"})))
            .await?;
        assert_eq!(created["id"], json!(service_id));
        assert_eq!(created["name"], json!("Nova"));

        // create/get agree on the stored dict
        let fetched = repo.get_service(&service_id).await?;
        assert_eq!(fetched, created);
        assert!(repo.list_service_ids().await?.contains(&service_id));

        // duplicate id surfaces as a typed conflict
        let err = repo
            .create_service(&service_id, dict(json!({"type": "compute"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { kind: EntityKind::Service, .. }));

        // update merges, leaving unspecified fields alone
        let updated = repo
            .update_service(&service_id, dict(json!({"description": "compute api"})))
            .await?;
        assert_eq!(updated["name"], json!("Nova"));
        assert_eq!(updated["description"], json!("compute api"));
        assert_eq!(updated["id"], json!(service_id));

        repo.delete_service(&service_id).await?;
        let err = repo.get_service(&service_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Service, .. }));
        let err = repo.delete_service(&service_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Service, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn endpoint_requires_existing_service() -> Result<(), anyhow::Error> {
        let db = match test_support::try_db().await {
            Some(db) => db,
            None => return Ok(()),
        };
        let repo = SeaOrmCatalogRepository::new(db);

        let endpoint_id = format!("ep-{}", Uuid::new_v4());
        let missing_service = format!("svc-{}", Uuid::new_v4());
        let err = repo
            .create_endpoint(
                &endpoint_id,
                dict(json!({
                    "region": "RegionOne",
                    "service_id": missing_service,
                    "publicurl": "http://host/v1/$(tenant_id)s",
                })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Service, .. }));
        // the failed create must not have written anything
        let err = repo.get_endpoint(&endpoint_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Endpoint, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn endpoint_crud_against_sql() -> Result<(), anyhow::Error> {
        let db = match test_support::try_db().await {
            Some(db) => db,
            None => return Ok(()),
        };
        let repo = SeaOrmCatalogRepository::new(db);

        let service_id = format!("svc-{}", Uuid::new_v4());
        repo.create_service(&service_id, dict(json!({"type": "identity", "name": "Identity API"})))
            .await?;

        let endpoint_id = format!("ep-{}", Uuid::new_v4());
        let created = repo
            .create_endpoint(
                &endpoint_id,
                dict(json!({
                    "region": "RegionOne",
                    "service_id": service_id,
                    "publicurl": "http://host:5000/v2.0",
                    "internalurl": "http://internal:5000/v2.0",
                    "adminurl": "http://admin:35357/v2.0",
                })),
            )
            .await?;
        assert_eq!(repo.get_endpoint(&endpoint_id).await?, created);

        let updated = repo
            .update_endpoint(&endpoint_id, dict(json!({"region": "RegionTwo"})))
            .await?;
        assert_eq!(updated["region"], json!("RegionTwo"));
        assert_eq!(updated["publicurl"], json!("http://host:5000/v2.0"));

        repo.delete_endpoint(&endpoint_id).await?;
        repo.delete_service(&service_id).await?;
        Ok(())
    }
}
