// Main entry point - Dependency injection and server setup
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pink_morsel_dashboard::application::dashboard_service::DashboardService;
use pink_morsel_dashboard::application::data_store::DataStore;
use pink_morsel_dashboard::application::session_registry::SessionRegistry;
use pink_morsel_dashboard::domain::dashboard::DashboardPage;
use pink_morsel_dashboard::infrastructure::config::{DEFAULT_CONFIG_FILE, load_settings};
use pink_morsel_dashboard::infrastructure::csv_repository::CsvSalesRepository;
use pink_morsel_dashboard::presentation::app_state::AppState;
use pink_morsel_dashboard::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config_file =
        std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let settings = load_settings(&config_file).context("invalid dashboard configuration")?;
    let addr = settings.bind_addr()?;

    // Load the dataset once; the server does not start without it
    let repository = CsvSalesRepository::new(&settings.data.path);
    let store = DataStore::load(&repository).await.with_context(|| {
        format!(
            "cannot start dashboard: failed to load '{}'",
            repository.path().display()
        )
    })?;
    let store = Arc::new(store);

    // Create services (application layer)
    let dashboard_service = DashboardService::new(
        store,
        settings.chart.reference_date,
        settings.chart_options(),
    );
    // Each page load gets its own controller
    let sessions = SessionRegistry::new(dashboard_service.clone(), settings.session_idle_ttl());

    // Create application state
    let page = DashboardPage::new(
        settings.header(),
        settings.description(),
        settings.chart.kind,
        &settings.page.regions,
    );
    let state = Arc::new(AppState {
        page,
        dashboard_service,
        sessions,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    tracing::info!("Starting pink morsel dashboard on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, router).await?;

    Ok(())
}
