use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use models::dict::Dict;

use crate::catalog::repository::CatalogRepository;
use crate::errors::StoreError;
use crate::template;

/// One rendered catalog entry. The capitalized URL keys are part of the
/// external contract even though the stored endpoint fields are lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "publicURL")]
    pub public_url: String,
    #[serde(rename = "adminURL")]
    pub admin_url: String,
    #[serde(rename = "internalURL")]
    pub internal_url: String,
}

/// Rendered catalog: region -> service type -> URL set.
pub type Catalog = HashMap<String, HashMap<String, CatalogEntry>>;

/// Business layer over catalog persistence plus catalog rendering.
///
/// Holds the repository abstraction, never a concrete engine, and the flat
/// configuration variables available to URL templates.
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    template_vars: HashMap<String, String>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>, template_vars: HashMap<String, String>) -> Self {
        Self { repo, template_vars }
    }

    /// Wire the template variables from loaded configuration.
    pub fn with_config(repo: Arc<dyn CatalogRepository>, config: &configs::CatalogConfig) -> Self {
        Self::new(repo, config.variables.clone())
    }

    pub async fn create_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError> {
        self.repo.create_service(service_id, service).await
    }

    pub async fn get_service(&self, service_id: &str) -> Result<Dict, StoreError> {
        self.repo.get_service(service_id).await
    }

    pub async fn list_service_ids(&self) -> Result<Vec<String>, StoreError> {
        self.repo.list_service_ids().await
    }

    pub async fn list_services(&self) -> Result<Vec<Dict>, StoreError> {
        self.repo.list_services().await
    }

    pub async fn update_service(&self, service_id: &str, service: Dict) -> Result<Dict, StoreError> {
        self.repo.update_service(service_id, service).await
    }

    pub async fn delete_service(&self, service_id: &str) -> Result<(), StoreError> {
        self.repo.delete_service(service_id).await
    }

    pub async fn create_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError> {
        self.repo.create_endpoint(endpoint_id, endpoint).await
    }

    pub async fn get_endpoint(&self, endpoint_id: &str) -> Result<Dict, StoreError> {
        self.repo.get_endpoint(endpoint_id).await
    }

    pub async fn list_endpoint_ids(&self) -> Result<Vec<String>, StoreError> {
        self.repo.list_endpoint_ids().await
    }

    pub async fn list_endpoints(&self) -> Result<Vec<Dict>, StoreError> {
        self.repo.list_endpoints().await
    }

    pub async fn update_endpoint(&self, endpoint_id: &str, endpoint: Dict) -> Result<Dict, StoreError> {
        self.repo.update_endpoint(endpoint_id, endpoint).await
    }

    pub async fn delete_endpoint(&self, endpoint_id: &str) -> Result<(), StoreError> {
        self.repo.delete_endpoint(endpoint_id).await
    }

    /// Render the per-user, per-tenant service catalog.
    ///
    /// Walks every endpoint, resolves its owning service, and fills
    /// `catalog[region][service_type]` with the templated URL set. The
    /// substitution context is the configured variables with `tenant_id` and
    /// `user_id` layered on top. An endpoint whose service no longer exists
    /// is a hard not-found, never skipped. Two endpoints sharing a
    /// (region, service type) pair overwrite each other; the last one
    /// processed wins.
    pub async fn get_catalog(&self, user_id: &str, tenant_id: &str) -> Result<Catalog, StoreError> {
        let mut vars = self.template_vars.clone();
        vars.insert("tenant_id".to_owned(), tenant_id.to_owned());
        vars.insert("user_id".to_owned(), user_id.to_owned());

        let mut catalog = Catalog::new();
        for endpoint_id in self.repo.list_endpoint_ids().await? {
            let endpoint = self.repo.get_endpoint(&endpoint_id).await?;
            let service_id = require_str(&endpoint, "service_id", "endpoint", &endpoint_id)?;
            let service = self.repo.get_service(service_id).await?;

            let service_type = require_str(&service, "type", "service", service_id)?.to_owned();
            let name = require_str(&service, "name", "service", service_id)?.to_owned();
            let region = require_str(&endpoint, "region", "endpoint", &endpoint_id)?.to_owned();

            let entry = CatalogEntry {
                name,
                public_url: template::render(
                    require_str(&endpoint, "publicurl", "endpoint", &endpoint_id)?,
                    &vars,
                )?,
                admin_url: template::render(
                    require_str(&endpoint, "adminurl", "endpoint", &endpoint_id)?,
                    &vars,
                )?,
                internal_url: template::render(
                    require_str(&endpoint, "internalurl", "endpoint", &endpoint_id)?,
                    &vars,
                )?,
            };
            catalog.entry(region).or_default().insert(service_type, entry);
        }
        debug!(user_id = %user_id, tenant_id = %tenant_id, regions = catalog.len(), "catalog_rendered");
        Ok(catalog)
    }
}

fn require_str<'a>(dict: &'a Dict, field: &str, kind: &str, id: &str) -> Result<&'a str, StoreError> {
    dict.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Validation(format!("{kind} {id} has no string '{field}' field")))
}
