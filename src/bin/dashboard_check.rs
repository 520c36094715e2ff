// Verifies that a running dashboard serves its header, chart and region picker
use anyhow::Context;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use pink_morsel_dashboard::infrastructure::config::{DEFAULT_CONFIG_FILE, load_settings};
use pink_morsel_dashboard::infrastructure::page_check::{
    DEFAULT_WAIT, PageExpectations, wait_for_page,
};
use pink_morsel_dashboard::presentation::page::RADIO_ID;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_file =
        std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let settings = load_settings(&config_file).context("invalid dashboard configuration")?;

    // Usage: dashboard-check [URL] [WAIT_SECONDS]
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("http://{}/", settings.server.bind));
    let wait = match std::env::args().nth(2) {
        Some(secs) => Duration::from_secs(
            secs.parse()
                .with_context(|| format!("invalid wait seconds '{}'", secs))?,
        ),
        None => DEFAULT_WAIT,
    };

    let expectations = PageExpectations {
        header: settings.header(),
        chart_id: settings.chart.kind.element_id().to_string(),
        radio_id: RADIO_ID.to_string(),
    };

    tracing::info!("Checking {} (waiting up to {:?})", url, wait);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    wait_for_page(&client, &url, &expectations, wait).await
}
