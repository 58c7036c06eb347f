use std::sync::Arc;

use crate::analysis::alignment::AlignmentScorer;
use crate::analysis::overview::OverviewCache;
use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when GEMINI_API_KEY is unset; scoring still works without it.
    pub llm: Option<Arc<dyn TextGenerator>>,
    pub config: Config,
    /// Pluggable alignment scorer. Default: BucketOverlapScorer.
    pub scorer: Arc<dyn AlignmentScorer>,
    pub overview_cache: Arc<OverviewCache>,
}
