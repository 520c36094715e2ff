// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::session_registry::SessionRegistry;
use crate::domain::dashboard::DashboardPage;

pub struct AppState {
    pub page: DashboardPage,
    pub dashboard_service: DashboardService,
    pub sessions: SessionRegistry,
}
