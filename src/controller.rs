// src/controller.rs
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::analysis::{AnalysisError, OfferAnalyzer};
use crate::image_ingest::ImagePayload;
use crate::session::{Session, SessionError, SessionView};
use crate::types::{AnalysisResult, InputMode};

/// Drives one session's analysis lifecycle against a shared analyzer.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct Controller {
    session: Arc<Mutex<Session>>,
    analyzer: Arc<dyn OfferAnalyzer>,
}

impl Controller {
    pub fn new(analyzer: Arc<dyn OfferAnalyzer>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            analyzer,
        }
    }

    pub async fn select_mode(&self, mode: InputMode) -> SessionView {
        let mut session = self.session.lock().await;
        session.select_mode(mode);
        session.snapshot()
    }

    pub async fn set_input(&self, value: impl Into<String>) -> Result<SessionView, SessionError> {
        let mut session = self.session.lock().await;
        session.set_input(value)?;
        Ok(session.snapshot())
    }

    pub async fn load_image(&self, image: ImagePayload) -> Result<SessionView, SessionError> {
        let mut session = self.session.lock().await;
        session.load_image(image)?;
        Ok(session.snapshot())
    }

    pub async fn clear_image(&self) -> SessionView {
        let mut session = self.session.lock().await;
        session.clear_image();
        session.snapshot()
    }

    pub async fn reset(&self) -> SessionView {
        let mut session = self.session.lock().await;
        session.reset();
        session.snapshot()
    }

    /// Validates, issues exactly one analyzer call, and settles the session.
    ///
    /// The lock is released while the call is outstanding, so views taken in
    /// the meantime report Pending and a concurrent submit is rejected with
    /// [`SessionError::InFlight`]. The call and its settlement run on their
    /// own task, so dropping this future never leaves the session Pending.
    pub async fn submit(&self) -> Result<AnalysisResult, SessionError> {
        let pending = self.session.lock().await.begin()?;
        let generation = pending.generation();

        let session = self.session.clone();
        let analyzer = self.analyzer.clone();
        let task = tokio::spawn(async move {
            let outcome = analyzer.analyze(&pending.request).await;
            let settled = session.lock().await.settle(pending, outcome);
            if let Err(SessionError::Superseded) = &settled {
                warn!("Session changed during analysis; outcome discarded");
            }
            settled
        });

        match task.await {
            Ok(settled) => settled,
            Err(e) => {
                error!("Analysis task did not complete: {}", e);
                let cause = AnalysisError::Service(format!("analysis task failed: {}", e));
                self.session.lock().await.abandon(generation, cause)
            }
        }
    }

    pub async fn report(&self) -> Option<String> {
        self.session.lock().await.report()
    }

    pub async fn snapshot(&self) -> SessionView {
        self.session.lock().await.snapshot()
    }
}
