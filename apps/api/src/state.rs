use std::sync::Arc;

use crate::config::Config;
use crate::screening::backend::ScoringBackend;
use crate::screening::store::ScreeningStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Scoring backend. Default: `LlmClient`; tests swap in a scripted fake.
    pub scorer: Arc<dyn ScoringBackend>,
    /// Persistence collaborator. Default: `SqlScreeningStore` (Postgres + S3).
    pub store: Arc<dyn ScreeningStore>,
    pub config: Config,
}
