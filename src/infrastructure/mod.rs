// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod json_file_store;
pub mod sse;
pub mod static_catalog;
