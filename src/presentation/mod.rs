// Presentation layer - HTTP surface consumed by the dashboard
pub mod app_state;
pub mod handlers;
pub mod server;
