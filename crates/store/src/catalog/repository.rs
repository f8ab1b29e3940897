use async_trait::async_trait;

use models::dict::Dict;

use crate::errors::StoreError;

/// Repository abstraction over service and endpoint persistence.
///
/// Every engine provides the same contract: `create` rejects duplicate ids
/// with a typed conflict, `update` merges the supplied fields over the stored
/// dict (never a replace, `id` is immutable), and lookups on absent ids fail
/// with a typed not-found. `create_endpoint` requires the referenced service
/// to exist.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError>;
    async fn get_service(&self, service_id: &str) -> Result<Dict, StoreError>;
    async fn list_service_ids(&self) -> Result<Vec<String>, StoreError>;
    async fn list_services(&self) -> Result<Vec<Dict>, StoreError>;
    async fn update_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError>;
    async fn delete_service(&self, service_id: &str) -> Result<(), StoreError>;

    async fn create_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError>;
    async fn get_endpoint(&self, endpoint_id: &str) -> Result<Dict, StoreError>;
    async fn list_endpoint_ids(&self) -> Result<Vec<String>, StoreError>;
    async fn list_endpoints(&self) -> Result<Vec<Dict>, StoreError>;
    async fn update_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError>;
    async fn delete_endpoint(&self, endpoint_id: &str) -> Result<(), StoreError>;
}

/// Simple in-memory repository for tests and doc examples.
pub mod mock {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;
    use crate::errors::EntityKind;

    /// Backs both entity kinds with ordered maps so iteration order, and with
    /// it the catalog collision outcome, is deterministic in tests.
    #[derive(Default)]
    pub struct InMemoryCatalogRepository {
        services: Mutex<BTreeMap<String, Dict>>,
        endpoints: Mutex<BTreeMap<String, Dict>>,
    }

    fn create(
        map: &mut BTreeMap<String, Dict>,
        kind: EntityKind,
        id: &str,
        mut fields: Dict,
    ) -> Result<Dict, StoreError> {
        if map.contains_key(id) {
            return Err(StoreError::conflict(kind, format!("duplicate id {id}")));
        }
        fields.insert("id".to_owned(), Value::String(id.to_owned()));
        map.insert(id.to_owned(), fields.clone());
        Ok(fields)
    }

    fn update(
        map: &mut BTreeMap<String, Dict>,
        kind: EntityKind,
        id: &str,
        fields: Dict,
    ) -> Result<Dict, StoreError> {
        let existing = map.get_mut(id).ok_or_else(|| StoreError::not_found(kind, id))?;
        for (k, v) in fields {
            existing.insert(k, v);
        }
        existing.insert("id".to_owned(), Value::String(id.to_owned()));
        Ok(existing.clone())
    }

    #[async_trait]
    impl CatalogRepository for InMemoryCatalogRepository {
        async fn create_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError> {
            let mut services = self.services.lock().unwrap();
            create(&mut services, EntityKind::Service, service_id, service)
        }

        async fn get_service(&self, service_id: &str) -> Result<Dict, StoreError> {
            self.services
                .lock()
                .unwrap()
                .get(service_id)
                .cloned()
                .ok_or_else(|| StoreError::not_found(EntityKind::Service, service_id))
        }

        async fn list_service_ids(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.services.lock().unwrap().keys().cloned().collect())
        }

        async fn list_services(&self) -> Result<Vec<Dict>, StoreError> {
            Ok(self.services.lock().unwrap().values().cloned().collect())
        }

        async fn update_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError> {
            let mut services = self.services.lock().unwrap();
            update(&mut services, EntityKind::Service, service_id, service)
        }

        async fn delete_service(&self, service_id: &str) -> Result<(), StoreError> {
            self.services
                .lock()
                .unwrap()
                .remove(service_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found(EntityKind::Service, service_id))
        }

        async fn create_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError> {
            let service_id = endpoint
                .get("service_id")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    StoreError::Validation(format!("endpoint {endpoint_id} has no 'service_id'"))
                })?
                .to_owned();
            self.get_service(&service_id).await?;
            let mut endpoints = self.endpoints.lock().unwrap();
            create(&mut endpoints, EntityKind::Endpoint, endpoint_id, endpoint)
        }

        async fn get_endpoint(&self, endpoint_id: &str) -> Result<Dict, StoreError> {
            self.endpoints
                .lock()
                .unwrap()
                .get(endpoint_id)
                .cloned()
                .ok_or_else(|| StoreError::not_found(EntityKind::Endpoint, endpoint_id))
        }

        async fn list_endpoint_ids(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.endpoints.lock().unwrap().keys().cloned().collect())
        }

        async fn list_endpoints(&self) -> Result<Vec<Dict>, StoreError> {
            Ok(self.endpoints.lock().unwrap().values().cloned().collect())
        }

        async fn update_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError> {
            let mut endpoints = self.endpoints.lock().unwrap();
            update(&mut endpoints, EntityKind::Endpoint, endpoint_id, endpoint)
        }

        async fn delete_endpoint(&self, endpoint_id: &str) -> Result<(), StoreError> {
            self.endpoints
                .lock()
                .unwrap()
                .remove(endpoint_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found(EntityKind::Endpoint, endpoint_id))
        }
    }
}
