// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    change_selector, current_chart, get_chart, health_check, index, list_regions, stream_chart,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/api/regions", get(list_regions))
        .route("/api/chart", get(get_chart))
        .route("/api/sessions/:session/chart", get(current_chart))
        .route("/api/sessions/:session/chart/stream", get(stream_chart))
        .route("/api/sessions/:session/selector", post(change_selector))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::tests::scenario_service;
    use crate::application::session_registry::SessionRegistry;
    use crate::domain::chart::ChartKind;
    use crate::domain::dashboard::DashboardPage;
    use scraper::{Html, Selector};
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::time::Duration;

    async fn serve() -> SocketAddr {
        let service = scenario_service();
        let regions: Vec<String> = ["north", "south", "east", "west"]
            .into_iter()
            .map(String::from)
            .collect();
        let state = Arc::new(AppState {
            page: DashboardPage::new(
                "Soul Foods - Pink Morsel Sales Performance".to_string(),
                "Daily Pink Morsel sales.".to_string(),
                ChartKind::Line,
                &regions,
            ),
            sessions: SessionRegistry::new(service.clone(), Duration::from_secs(3600)),
            dashboard_service: service,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_page_elements_present() {
        let addr = serve().await;
        let html = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(html.contains("Soul Foods - Pink Morsel Sales Performance"));
        assert!(html.contains(r#"id="sales-line-chart""#));
        assert!(html.contains(r#"id="region-radio""#));
    }

    #[tokio::test]
    async fn test_stateless_chart_endpoint() {
        let addr = serve().await;
        let chart: Value = reqwest::get(format!("http://{addr}/api/chart?region=north"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let series = chart["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["region"], "north");
        assert_eq!(series[0]["points"].as_array().unwrap().len(), 2);
        assert_eq!(chart["marker"]["date"], "2021-01-15");

        let empty: Value = reqwest::get(format!("http://{addr}/api/chart?region=west"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(empty["series"].as_array().unwrap().is_empty());
        assert!(empty["marker"].is_null());
    }

    struct OpenedPage {
        session: String,
        checked: Vec<String>,
    }

    async fn open_page(client: &reqwest::Client, addr: SocketAddr) -> OpenedPage {
        let html = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let document = Html::parse_document(&html);
        let body = Selector::parse("body[data-session]").unwrap();
        let checked = Selector::parse("#region-radio input[checked]").unwrap();

        OpenedPage {
            session: document
                .select(&body)
                .next()
                .and_then(|b| b.value().attr("data-session"))
                .expect("page carries no session")
                .to_string(),
            checked: document
                .select(&checked)
                .filter_map(|input| input.value().attr("value"))
                .map(String::from)
                .collect(),
        }
    }

    async fn wait_for_session_selector(
        client: &reqwest::Client,
        addr: SocketAddr,
        session: &str,
        selector: &str,
    ) -> Value {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let current: Value = client
                    .get(format!("http://{addr}/api/sessions/{session}/chart"))
                    .send()
                    .await
                    .unwrap()
                    .json()
                    .await
                    .unwrap();
                if current["selector"] == selector {
                    return current;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("selector change never displayed")
    }

    #[tokio::test]
    async fn test_selector_change_updates_session_chart() {
        let addr = serve().await;
        let client = reqwest::Client::new();
        let page = open_page(&client, addr).await;

        let response = client
            .post(format!("http://{addr}/api/sessions/{}/selector", page.session))
            .json(&serde_json::json!({ "region": "south" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

        let current = wait_for_session_selector(&client, addr, &page.session, "south").await;
        assert_eq!(current["chart"]["series"][0]["region"], "south");
        assert!(current["revision"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_fresh_page_ignores_other_sessions() {
        let addr = serve().await;
        let client = reqwest::Client::new();

        let first = open_page(&client, addr).await;
        assert_eq!(first.checked, vec!["all"]);
        client
            .post(format!("http://{addr}/api/sessions/{}/selector", first.session))
            .json(&serde_json::json!({ "region": "south" }))
            .send()
            .await
            .unwrap();
        wait_for_session_selector(&client, addr, &first.session, "south").await;

        let second = open_page(&client, addr).await;
        assert_ne!(second.session, first.session);
        assert_eq!(second.checked, vec!["all"]);
        let current: Value = client
            .get(format!("http://{addr}/api/sessions/{}/chart", second.session))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(current["selector"], "all");
        assert_eq!(current["state"], "idle");
        assert_eq!(current["revision"], 0);
        assert_eq!(current["chart"]["series"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let addr = serve().await;
        let client = reqwest::Client::new();
        let missing = uuid::Uuid::new_v4();

        let response = client
            .post(format!("http://{addr}/api/sessions/{missing}/selector"))
            .json(&serde_json::json!({ "region": "south" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let response = client
            .get(format!("http://{addr}/api/sessions/{missing}/chart/stream"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_stream_starts_with_current_chart() {
        let addr = serve().await;
        let client = reqwest::Client::new();
        let page = open_page(&client, addr).await;

        let mut response = client
            .get(format!("http://{addr}/api/sessions/{}/chart/stream", page.session))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.headers()["content-type"],
            "application/x-ndjson"
        );
        let chunk = tokio::time::timeout(Duration::from_secs(2), response.chunk())
            .await
            .expect("no first line")
            .unwrap()
            .unwrap();
        let line = std::str::from_utf8(&chunk).unwrap().lines().next().unwrap();
        let first: Value = serde_json::from_str(line).unwrap();
        assert_eq!(first["selector"], "all");
        assert_eq!(first["revision"], 0);
    }

    #[tokio::test]
    async fn test_regions_endpoint() {
        let addr = serve().await;
        let regions: Vec<String> = reqwest::get(format!("http://{addr}/api/regions"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(regions, vec!["all", "north", "south", "east", "west"]);
    }
}
