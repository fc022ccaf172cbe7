use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::store::UserStore;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gateway to the generative model. `GeminiClient` outside of tests.
    pub llm: Arc<dyn TextGenerator>,
    /// Postgres-backed, or the in-memory demo store in degraded mode.
    pub users: Arc<dyn UserStore>,
    /// False in degraded mode: the demo store takes no new accounts.
    pub registration_open: bool,
    /// Where uploads live between write and extraction.
    pub upload_dir: PathBuf,
}
