// src/web/sessions.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::OfferAnalyzer;
use crate::controller::Controller;
use crate::core::config_manager::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_SECS};

struct SessionEntry {
    controller: Controller,
    last_seen: Instant,
}

/// Independent browser sessions, all sharing one analyzer.
///
/// Sessions idle for longer than `idle_timeout` are dropped, and the oldest
/// one is evicted when `max_sessions` would be exceeded.
pub struct SessionRegistry {
    analyzer: Arc<dyn OfferAnalyzer>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(analyzer: Arc<dyn OfferAnalyzer>) -> Self {
        Self::with_limits(
            analyzer,
            Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            DEFAULT_MAX_SESSIONS,
        )
    }

    pub fn with_limits(
        analyzer: Arc<dyn OfferAnalyzer>,
        idle_timeout: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            analyzer,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn create(&self) -> (Uuid, Controller) {
        let id = Uuid::new_v4();
        let controller = Controller::new(self.analyzer.clone());

        let mut sessions = self.sessions.write().await;
        self.sweep_idle(&mut sessions);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    warn!("Session limit reached, evicted session {}", oldest);
                }
                None => break,
            }
        }

        sessions.insert(
            id,
            SessionEntry {
                controller: controller.clone(),
                last_seen: Instant::now(),
            },
        );
        info!("Created session {} ({} active)", id, sessions.len());
        (id, controller)
    }

    /// Looks up a live session and marks it as used
    pub async fn get(&self, id: Uuid) -> Option<Controller> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;

        if entry.last_seen.elapsed() > self.idle_timeout {
            sessions.remove(&id);
            info!("Session {} expired", id);
            return None;
        }

        entry.last_seen = Instant::now();
        Some(entry.controller.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Removed session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn sweep_idle(&self, sessions: &mut HashMap<Uuid, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= self.idle_timeout);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Dropped {} idle sessions", expired);
        }
    }
}
