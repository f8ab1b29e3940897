use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dict::{self, Dict};
use crate::errors::ModelError;
use crate::service;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "endpoint")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub region: String,
    pub service_id: String,
    pub extra: Json,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Partition a flat dict into the indexed columns and the `extra` bag.
    /// The URL templates (`publicurl`, `internalurl`, `adminurl`) are
    /// conventionally carried in `extra`.
    pub fn from_dict(mut dict: Dict) -> Result<Self, ModelError> {
        let id = dict::take_string(&mut dict, "id", "endpoint")?;
        let region = dict::take_string(&mut dict, "region", "endpoint")?;
        let service_id = dict::take_string(&mut dict, "service_id", "endpoint")?;
        dict.remove("extra");
        Ok(Self { id, region, service_id, extra: Value::Object(dict) })
    }

    pub fn to_dict(&self) -> Dict {
        let mut dict = dict::extra_map(&self.extra);
        dict.insert("id".to_owned(), Value::String(self.id.clone()));
        dict.insert("region".to_owned(), Value::String(self.region.clone()));
        dict.insert("service_id".to_owned(), Value::String(self.service_id.clone()));
        dict
    }
}
