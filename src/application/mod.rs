// Application layer - Telemetry simulation use cases
pub mod debounce;
pub mod fleet_service;
pub mod history_store;
pub mod machine_catalog;
pub mod metric_generator;
pub mod session_runner;
pub mod telemetry_session;
