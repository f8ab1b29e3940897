//! Policy module: repository abstraction, SQL and key-value engines, and the
//! conflict-checking service on top.

pub mod repo;
pub mod repository;
pub mod service;

pub use service::PolicyService;
