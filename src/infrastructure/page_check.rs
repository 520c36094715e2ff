// End-to-end presence check against a running dashboard
use scraper::{Html, Selector};
use std::time::{Duration, Instant};

pub const DEFAULT_WAIT: Duration = Duration::from_secs(15);
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PageExpectations {
    pub header: String,
    pub chart_id: String,
    pub radio_id: String,
}

impl PageExpectations {
    /// Expectations that are not yet satisfied by `html`
    pub fn missing(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut missing = Vec::new();
        if !has_header(&document, &self.header) {
            missing.push(format!("header '{}'", self.header));
        }
        if !has_element_id(&document, &self.chart_id) {
            missing.push(format!("chart #{}", self.chart_id));
        }
        if !has_element_id(&document, &self.radio_id) {
            missing.push(format!("region picker #{}", self.radio_id));
        }
        missing
    }
}

/// Any `h1` whose decoded text contains `expected`
fn has_header(document: &Html, expected: &str) -> bool {
    let Ok(selector) = Selector::parse("h1") else {
        return false;
    };
    document
        .select(&selector)
        .any(|h1| h1.text().collect::<String>().contains(expected))
}

fn has_element_id(document: &Html, id: &str) -> bool {
    match Selector::parse(&format!("[id=\"{}\"]", id)) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(e) => {
            tracing::warn!("Cannot build selector for id '{}': {}", id, e);
            false
        }
    }
}

/// Poll `url` until every expectation holds or `wait` runs out
pub async fn wait_for_page(
    client: &reqwest::Client,
    url: &str,
    expectations: &PageExpectations,
    wait: Duration,
) -> anyhow::Result<()> {
    let deadline = Instant::now() + wait;
    let mut last_problem = String::from("no response yet");

    loop {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                let html = response.text().await?;
                let missing = expectations.missing(&html);
                if missing.is_empty() {
                    tracing::info!("Dashboard at {} has all expected elements", url);
                    return Ok(());
                }
                last_problem = format!("missing {}", missing.join(", "));
            }
            Ok(response) => last_problem = format!("status {}", response.status()),
            Err(e) => last_problem = e.to_string(),
        }

        if Instant::now() >= deadline {
            anyhow::bail!("dashboard check timed out after {:?}: {}", wait, last_problem);
        }
        tracing::debug!("Dashboard not ready: {}", last_problem);
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
