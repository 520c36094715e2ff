// Reactive controller - Binds the region selector to the displayed chart
use crate::application::dashboard_service::DashboardService;
use crate::domain::chart::ChartDescription;
use crate::domain::sales::RegionSelector;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

const EVENT_BUFFER: usize = 32;
const TRANSITION_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Idle,
    Recomputing,
}

/// The chart currently on screen
#[derive(Debug, Clone, Serialize)]
pub struct DisplayedChart {
    pub revision: u64,
    pub selector: RegionSelector,
    pub chart: Arc<ChartDescription>,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("reactive controller has shut down")]
    Closed,
}

/// Handle to the controller task.
///
/// Selector changes are queued on a single-consumer channel. The task drains
/// the queue down to its newest event, rebuilds the chart, and publishes it
/// in one swap, so readers only ever see complete charts and a burst of
/// changes settles on the last selector.
#[derive(Clone)]
pub struct ReactiveController {
    events: mpsc::Sender<RegionSelector>,
    displayed: watch::Receiver<DisplayedChart>,
    state: watch::Receiver<ControllerState>,
    transitions: broadcast::Sender<ControllerState>,
}

impl ReactiveController {
    /// Build the initial chart and spawn the event loop
    pub fn spawn(service: DashboardService, initial: RegionSelector) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let first = DisplayedChart {
            revision: 0,
            chart: Arc::new(service.render(&initial)),
            selector: initial,
        };
        let (displayed_tx, displayed_rx) = watch::channel(first);
        let (state_tx, state_rx) = watch::channel(ControllerState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);

        tokio::spawn(run(
            service,
            events_rx,
            displayed_tx,
            StateCell {
                current: state_tx,
                transitions: transitions.clone(),
            },
        ));

        Self {
            events: events_tx,
            displayed: displayed_rx,
            state: state_rx,
            transitions,
        }
    }

    /// Queue a selector-change event
    pub async fn select(&self, selector: RegionSelector) -> Result<(), ControllerError> {
        self.events
            .send(selector)
            .await
            .map_err(|_| ControllerError::Closed)
    }

    pub fn current(&self) -> DisplayedChart {
        self.displayed.borrow().clone()
    }

    pub fn state(&self) -> ControllerState {
        *self.state.borrow()
    }

    /// Receiver that wakes on every chart swap
    pub fn subscribe(&self) -> watch::Receiver<DisplayedChart> {
        self.displayed.clone()
    }

    /// Every Idle/Recomputing transition from now on, in order
    pub fn transitions(&self) -> broadcast::Receiver<ControllerState> {
        self.transitions.subscribe()
    }
}

struct StateCell {
    current: watch::Sender<ControllerState>,
    transitions: broadcast::Sender<ControllerState>,
}

impl StateCell {
    fn set(&self, state: ControllerState) {
        self.current.send_replace(state);
        // No subscribers is fine
        let _ = self.transitions.send(state);
    }
}

async fn run(
    service: DashboardService,
    mut events: mpsc::Receiver<RegionSelector>,
    displayed: watch::Sender<DisplayedChart>,
    state: StateCell,
) {
    let mut revision = displayed.borrow().revision;

    while let Some(mut selector) = events.recv().await {
        // Coalesce whatever queued up while we were busy
        let mut skipped = 0usize;
        while let Ok(next) = events.try_recv() {
            selector = next;
            skipped += 1;
        }

        state.set(ControllerState::Recomputing);
        tracing::debug!(
            "Recomputing chart for selector {} ({} stale events skipped)",
            selector,
            skipped
        );

        let chart = Arc::new(service.render(&selector));
        revision += 1;
        displayed.send_replace(DisplayedChart {
            revision,
            selector,
            chart,
        });

        state.set(ControllerState::Idle);
        tracing::debug!("Displayed chart revision {}", revision);
    }

    tracing::debug!("Selector channel closed, controller stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::tests::scenario_service;
    use std::time::Duration;

    async fn wait_for_selector(
        rx: &mut watch::Receiver<DisplayedChart>,
        selector: &RegionSelector,
    ) -> DisplayedChart {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                {
                    let current = rx.borrow_and_update();
                    if &current.selector == selector {
                        return current.clone();
                    }
                }
                rx.changed().await.expect("controller dropped");
            }
        })
        .await
        .expect("selector never displayed")
    }

    #[tokio::test]
    async fn test_initial_chart_is_displayed() {
        let controller = ReactiveController::spawn(scenario_service(), RegionSelector::All);
        let current = controller.current();
        assert_eq!(current.revision, 0);
        assert_eq!(current.selector, RegionSelector::All);
        assert_eq!(current.chart.series.len(), 2);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_selector_change_swaps_chart() {
        let controller = ReactiveController::spawn(scenario_service(), RegionSelector::All);
        let mut rx = controller.subscribe();
        let north = RegionSelector::from("north");

        controller.select(north.clone()).await.unwrap();
        let displayed = wait_for_selector(&mut rx, &north).await;

        assert!(displayed.revision >= 1);
        assert_eq!(displayed.chart.series.len(), 1);
        assert_eq!(displayed.chart.series[0].region.as_str(), "north");
    }

    #[tokio::test]
    async fn test_rapid_changes_settle_on_last_value() {
        let controller = ReactiveController::spawn(scenario_service(), RegionSelector::All);
        let mut rx = controller.subscribe();

        let burst = ["north", "south", "west", "all", "east"];
        for label in burst {
            controller.select(RegionSelector::from(label)).await.unwrap();
        }
        let east = RegionSelector::from("east");
        wait_for_selector(&mut rx, &east).await;

        // Nothing queued behind the last event may overwrite it
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = controller.current();
        assert_eq!(settled.selector, east);
        assert!(settled.chart.series.is_empty());
        assert!(
            settled.revision < burst.len() as u64,
            "burst was not coalesced: revision {}",
            settled.revision
        );
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_selector_change_passes_through_recomputing() {
        let controller = ReactiveController::spawn(scenario_service(), RegionSelector::All);
        let mut transitions = controller.transitions();
        assert_eq!(controller.state(), ControllerState::Idle);

        controller.select(RegionSelector::from("north")).await.unwrap();

        let observed = tokio::time::timeout(Duration::from_secs(2), async {
            vec![
                transitions.recv().await.unwrap(),
                transitions.recv().await.unwrap(),
            ]
        })
        .await
        .expect("no state transitions");
        assert_eq!(
            observed,
            vec![ControllerState::Recomputing, ControllerState::Idle]
        );
        assert_eq!(controller.current().revision, 1);
    }

    #[tokio::test]
    async fn test_unknown_selector_displays_empty_chart() {
        let controller = ReactiveController::spawn(scenario_service(), RegionSelector::All);
        let mut rx = controller.subscribe();
        let west = RegionSelector::from("west");

        controller.select(west.clone()).await.unwrap();
        let displayed = wait_for_selector(&mut rx, &west).await;
        assert!(displayed.chart.series.is_empty());
    }
}
