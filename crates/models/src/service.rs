use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dict::{self, Dict};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub r#type: String,
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
    /// Everything that is not `id` or `type` lands in `extra`.
    pub fn from_dict(mut dict: Dict) -> Result<Self, ModelError> {
        let id = dict::take_string(&mut dict, "id", "service")?;
        let r#type = dict::take_string(&mut dict, "type", "service")?;
        dict.remove("extra");
        Ok(Self { id, r#type, extra: Value::Object(dict) })
    }

    /// Re-flatten: copy the extra bag and overlay the fixed columns on top,
    /// so a stray same-named extra key can never shadow a real column.
    pub fn to_dict(&self) -> Dict {
        let mut dict = dict::extra_map(&self.extra);
        dict.insert("id".to_owned(), Value::String(self.id.clone()));
        dict.insert("type".to_owned(), Value::String(self.r#type.clone()));
        dict
    }
}
