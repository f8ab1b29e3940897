use serde_json::{json, Value};

use crate::dict::Dict;
use crate::errors::ModelError;
use crate::{endpoint, policy, service};

fn dict(value: Value) -> Dict {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

#[test]
fn service_round_trip_is_lossless() {
    let input = dict(json!({
        "id": "s1",
        "type": "compute",
        "name": "Nova",
        "description": "compute service",
    }));
    let model = service::Model::from_dict(input.clone()).unwrap();
    assert_eq!(model.id, "s1");
    assert_eq!(model.r#type, "compute");
    assert_eq!(model.to_dict(), input);
}

#[test]
fn service_partition_puts_unknown_keys_in_extra() {
    let model = service::Model::from_dict(dict(json!({
        "id": "s1",
        "type": "compute",
        "name": "Nova",
    })))
    .unwrap();
    let extra = model.extra.as_object().unwrap();
    assert_eq!(extra.len(), 1);
    assert_eq!(extra["name"], json!("Nova"));
    assert!(!extra.contains_key("id"));
    assert!(!extra.contains_key("type"));
}

#[test]
fn service_fixed_fields_win_over_stray_extra_keys() {
    // cannot happen through from_dict, but to_dict must not rely on that
    let model = service::Model {
        id: "s1".into(),
        r#type: "compute".into(),
        extra: json!({"id": "bogus", "name": "Nova"}),
    };
    let flat = model.to_dict();
    assert_eq!(flat["id"], json!("s1"));
    assert_eq!(flat["name"], json!("Nova"));
}

#[test]
fn service_missing_fixed_field_is_a_validation_error() {
    let err = service::Model::from_dict(dict(json!({"id": "s1"}))).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let err = service::Model::from_dict(dict(json!({"id": 7, "type": "compute"}))).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[test]
fn endpoint_round_trip_is_lossless() {
    let input = dict(json!({
        "id": "e1",
        "region": "RegionOne",
        "service_id": "s1",
        "publicurl": "http://host/v1/$(tenant_id)s",
        "internalurl": "http://internal/v1/$(tenant_id)s",
        "adminurl": "http://admin/v1",
    }));
    let model = endpoint::Model::from_dict(input.clone()).unwrap();
    assert_eq!(model.service_id, "s1");
    assert_eq!(model.region, "RegionOne");
    assert_eq!(model.to_dict(), input);
}

#[test]
fn endpoint_requires_service_id() {
    let err = endpoint::Model::from_dict(dict(json!({
        "id": "e1",
        "region": "RegionOne",
    })))
    .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[test]
fn policy_round_trip_is_lossless() {
    let input = dict(json!({
        "id": "p1",
        "endpoint_id": "e1",
        "type": "application/json",
        "blob": {"rules": [{"match": "compute:create"}]},
        "owner": "ops",
    }));
    let model = policy::Model::from_dict(input.clone()).unwrap();
    assert_eq!(model.blob, json!({"rules": [{"match": "compute:create"}]}));
    assert_eq!(model.to_dict(), input);
}

#[test]
fn policy_blob_is_required_but_opaque() {
    let err = policy::Model::from_dict(dict(json!({
        "id": "p1",
        "endpoint_id": "e1",
        "type": "application/json",
    })))
    .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    // any JSON shape is accepted, including scalars
    let model = policy::Model::from_dict(dict(json!({
        "id": "p1",
        "endpoint_id": "e1",
        "type": "text/plain",
        "blob": "default deny",
    })))
    .unwrap();
    assert_eq!(model.blob, json!("default deny"));
}

#[test]
fn incoming_extra_key_is_discarded_not_nested() {
    // a literal "extra" key in the wire dict never becomes a nested bag
    let model = service::Model::from_dict(dict(json!({
        "id": "s1",
        "type": "compute",
        "extra": {"smuggled": true},
    })))
    .unwrap();
    assert_eq!(model.extra, json!({}));
}
