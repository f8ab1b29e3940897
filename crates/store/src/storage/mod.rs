//! Storage abstractions shared by the repository implementations.
//!
//! Contains the flat file-backed key-value store consumed by the kvs policy
//! repository.

pub mod json_kv_store;
