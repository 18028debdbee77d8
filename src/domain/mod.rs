// Domain layer - Machine telemetry models and pure derivations
pub mod alert;
pub mod connection;
pub mod history;
pub mod machine;
pub mod oee;
pub mod profile;
