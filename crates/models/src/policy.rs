use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dict::{self, Dict};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "policy")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub endpoint_id: String,
    pub r#type: String,
    pub blob: Json,
    pub extra: Json,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Partition a flat dict into the indexed columns and the `extra` bag.
    /// `blob` is the opaque policy document and must be present; its shape is
    /// not interpreted here.
    pub fn from_dict(mut dict: Dict) -> Result<Self, ModelError> {
        let id = dict::take_string(&mut dict, "id", "policy")?;
        let endpoint_id = dict::take_string(&mut dict, "endpoint_id", "policy")?;
        let r#type = dict::take_string(&mut dict, "type", "policy")?;
        let blob = dict::take_value(&mut dict, "blob", "policy")?;
        dict.remove("extra");
        Ok(Self { id, endpoint_id, r#type, blob, extra: Value::Object(dict) })
    }

    pub fn to_dict(&self) -> Dict {
        let mut dict = dict::extra_map(&self.extra);
        dict.insert("id".to_owned(), Value::String(self.id.clone()));
        dict.insert("endpoint_id".to_owned(), Value::String(self.endpoint_id.clone()));
        dict.insert("type".to_owned(), Value::String(self.r#type.clone()));
        dict.insert("blob".to_owned(), self.blob.clone());
        dict
    }
}
