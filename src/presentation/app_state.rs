// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::dashboard_service::DashboardService;
use crate::application::live_feed::FeedState;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub chart_service: ChartService,
    pub live: watch::Receiver<FeedState>,
}
