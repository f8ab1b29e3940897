use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Flat wire representation of an entity: the fixed fields of the record plus
/// whatever extra keys the caller supplied.
pub type Dict = Map<String, Value>;

/// Remove `field` from the dict, requiring a string value.
pub(crate) fn take_string(dict: &mut Dict, field: &str, entity: &str) -> Result<String, ModelError> {
    match dict.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ModelError::Validation(format!(
            "{entity}.{field} must be a string, got {other}"
        ))),
        None => Err(ModelError::Validation(format!(
            "{entity} dict missing required field '{field}'"
        ))),
    }
}

/// Remove `field` from the dict, requiring it to be present but accepting any
/// value shape.
pub(crate) fn take_value(dict: &mut Dict, field: &str, entity: &str) -> Result<Value, ModelError> {
    dict.remove(field).ok_or_else(|| {
        ModelError::Validation(format!("{entity} dict missing required field '{field}'"))
    })
}

/// View the stored `extra` column as a map. Anything other than a JSON object
/// is treated as an empty bag.
pub(crate) fn extra_map(extra: &Value) -> Dict {
    match extra {
        Value::Object(map) => map.clone(),
        _ => Dict::new(),
    }
}
