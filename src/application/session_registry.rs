// Session registry - One reactive controller per open dashboard page
use crate::application::dashboard_service::DashboardService;
use crate::application::reactive_controller::{DisplayedChart, ReactiveController};
use crate::domain::sales::RegionSelector;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

/// Held by an open chart stream; a followed session is never pruned
#[derive(Debug)]
pub struct Follower {
    _token: Arc<()>,
}

struct Session {
    controller: ReactiveController,
    followers: Arc<()>,
    last_seen: Instant,
}

impl Session {
    fn is_stale(&self, idle_ttl: Duration) -> bool {
        Arc::strong_count(&self.followers) == 1 && self.last_seen.elapsed() >= idle_ttl
    }
}

/// Every page load opens its own session starting at `all`, so one
/// browser's selector changes never leak into another's page.
pub struct SessionRegistry {
    service: DashboardService,
    idle_ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new(service: DashboardService, idle_ttl: Duration) -> Self {
        Self {
            service,
            idle_ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session with its own controller showing `all`
    pub async fn open(&self) -> (Uuid, ReactiveController) {
        let id = Uuid::new_v4();
        let controller = ReactiveController::spawn(self.service.clone(), RegionSelector::All);

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_stale(self.idle_ttl));
        if sessions.len() < before {
            tracing::debug!("Pruned {} idle sessions", before - sessions.len());
        }
        sessions.insert(
            id,
            Session {
                controller: controller.clone(),
                followers: Arc::new(()),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!("Opened session {} ({} active)", id, sessions.len());

        (id, controller)
    }

    /// Controller for `id`, marking the session as recently used
    pub async fn get(&self, id: &Uuid) -> Option<ReactiveController> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        Some(session.controller.clone())
    }

    /// Subscribe to the session's displayed chart for as long as the
    /// returned `Follower` is alive
    pub async fn follow(&self, id: &Uuid) -> Option<(watch::Receiver<DisplayedChart>, Follower)> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        Some((
            session.controller.subscribe(),
            Follower {
                _token: Arc::clone(&session.followers),
            },
        ))
    }
}
