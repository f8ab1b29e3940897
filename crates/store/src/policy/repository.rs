use async_trait::async_trait;

use models::dict::Dict;

use crate::errors::StoreError;

/// Repository abstraction over policy persistence.
///
/// Same contract as the catalog side: typed conflict on duplicate create,
/// merge-update that never reassigns `id`, typed not-found on absent lookups
/// and deletes.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn create_policy(&self, policy_id: &str, policy: Dict) -> Result<Dict, StoreError>;
    async fn get_policy(&self, policy_id: &str) -> Result<Dict, StoreError>;
    async fn list_policy_ids(&self) -> Result<Vec<String>, StoreError>;
    async fn list_policies(&self) -> Result<Vec<Dict>, StoreError>;
    async fn update_policy(&self, policy_id: &str, policy: Dict) -> Result<Dict, StoreError>;
    async fn delete_policy(&self, policy_id: &str) -> Result<(), StoreError>;
}
