//! LLM-backed JD/CV overview and transcript summary.
//!
//! The overview for a given (JD, CV) pair is generated once and then served
//! from `OverviewCache`, so re-submitting the same form does not re-bill the LLM.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::analysis::prompts::{build_overview_prompt, build_transcript_prompt};
use crate::errors::AppError;
use crate::llm_client::prompts::INTERVIEW_ASSISTANT_SYSTEM;
use crate::llm_client::TextGenerator;

/// The trimmed inputs an overview was generated from. Lookups compare the full
/// text, so two different pairs can never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverviewKey {
    jd_text: String,
    cv_text: String,
}

impl OverviewKey {
    /// Surrounding whitespace does not change the key.
    pub fn new(jd_text: &str, cv_text: &str) -> Self {
        Self {
            jd_text: jd_text.trim().to_string(),
            cv_text: cv_text.trim().to_string(),
        }
    }
}

/// Bounded in-memory cache of generated overviews.
/// When full it is cleared wholesale before the next insert.
pub struct OverviewCache {
    entries: RwLock<HashMap<OverviewKey, String>>,
    capacity: usize,
}

impl OverviewCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, key: &OverviewKey) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: OverviewKey, overview: String) {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            debug!("Overview cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert(key, overview);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

pub async fn generate_overview(
    llm: &dyn TextGenerator,
    cache: &OverviewCache,
    jd_text: &str,
    cv_text: &str,
) -> Result<String, AppError> {
    let key = OverviewKey::new(jd_text, cv_text);
    if let Some(hit) = cache.get(&key).await {
        debug!("Overview cache hit");
        return Ok(hit);
    }

    let prompt = build_overview_prompt(jd_text, cv_text);
    let overview = llm.generate(&prompt, INTERVIEW_ASSISTANT_SYSTEM).await?;

    info!("Generated JD/CV overview ({} chars)", overview.len());
    cache.insert(key, overview.clone()).await;
    Ok(overview)
}

pub async fn summarize_transcript(
    llm: &dyn TextGenerator,
    jd_text: &str,
    transcript: &str,
) -> Result<String, AppError> {
    let prompt = build_transcript_prompt(jd_text, transcript);
    let summary = llm.generate(&prompt, INTERVIEW_ASSISTANT_SYSTEM).await?;
    info!("Generated transcript summary ({} chars)", summary.len());
    Ok(summary)
}
