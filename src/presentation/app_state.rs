// Application state for HTTP handlers
use crate::application::fleet_service::FleetService;
use crate::application::session_runner::SessionHandle;

#[derive(Clone)]
pub struct AppState {
    pub fleet_service: FleetService,
    pub session: SessionHandle,
}
