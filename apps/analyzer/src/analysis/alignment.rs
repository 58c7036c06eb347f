//! CV ↔ JD alignment: a pluggable, trait-based scorer over capability buckets.
//!
//! Default: `BucketOverlapScorer` (pure-Rust, deterministic, no LLM call).
//!
//! `AppState` holds an `Arc<dyn AlignmentScorer>`, swapped at startup.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;

use crate::analysis::keywords::{CapabilityBucket, SKILL_BUCKETS};
use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Overlap between JD and CV for one capability bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BucketDetail {
    pub bucket: String,
    pub score: f64, // 0.0 – 100.0, one decimal
    pub intersection: BTreeSet<&'static str>,
    pub union: BTreeSet<&'static str>,
    /// Mentioned in the JD but not found in the CV.
    pub missing: BTreeSet<&'static str>,
}

/// Full alignment report returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub overall_score: f64,
    pub buckets: Vec<BucketDetail>,
    pub scorer_backend: String,
}

#[cfg(test)]
impl AlignmentReport {
    pub fn bucket(&self, name: &str) -> Option<&BucketDetail> {
        self.buckets.iter().find(|b| b.bucket == name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching handlers.
#[async_trait]
pub trait AlignmentScorer: Send + Sync {
    async fn score(&self, jd_text: &str, cv_text: &str) -> Result<AlignmentReport, AppError>;
}

/// Keyword overlap scorer.
///
/// Algorithm, per bucket:
/// 1. jd_items / cv_items = bucket keywords found (substring) in normalized text
/// 2. score = |jd ∩ cv| / |jd ∪ cv| × 100, rounded to one decimal (0 if union empty)
///
/// overall = mean of bucket scores, rounded to one decimal, capped at 100.
pub struct BucketOverlapScorer;

#[async_trait]
impl AlignmentScorer for BucketOverlapScorer {
    async fn score(&self, jd_text: &str, cv_text: &str) -> Result<AlignmentReport, AppError> {
        Ok(compute_cv_match(jd_text, cv_text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core overlap algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Lowercases and replaces every char outside `[a-z0-9 ]` with a space.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Substring containment. `led` matches inside `scaled`.
pub fn like_match(text: &str, keyword: &str) -> bool {
    text.contains(keyword)
}

pub fn compute_cv_match(jd_text: &str, cv_text: &str) -> AlignmentReport {
    let jd_text = normalize(jd_text);
    let cv_text = normalize(cv_text);

    let buckets: Vec<BucketDetail> = SKILL_BUCKETS
        .iter()
        .map(|bucket| score_bucket(bucket, &jd_text, &cv_text))
        .collect();

    let total: f64 = buckets.iter().map(|b| b.score).sum();
    let overall_score = if buckets.is_empty() {
        0.0
    } else {
        round1(total / buckets.len() as f64).min(100.0)
    };

    AlignmentReport {
        overall_score,
        buckets,
        scorer_backend: "bucket_overlap".to_string(),
    }
}

fn score_bucket(bucket: &CapabilityBucket, jd_text: &str, cv_text: &str) -> BucketDetail {
    let found_in = |text: &str| -> BTreeSet<&'static str> {
        bucket
            .keywords
            .iter()
            .copied()
            .filter(|kw| like_match(text, kw))
            .collect()
    };

    let jd_items = found_in(jd_text);
    let cv_items = found_in(cv_text);

    let intersection: BTreeSet<_> = jd_items.intersection(&cv_items).copied().collect();
    let union: BTreeSet<_> = jd_items.union(&cv_items).copied().collect();
    let missing: BTreeSet<_> = jd_items.difference(&cv_items).copied().collect();

    let score = if union.is_empty() {
        0.0
    } else {
        round1(intersection.len() as f64 / union.len() as f64 * 100.0)
    };

    BucketDetail {
        bucket: bucket.name.to_string(),
        score,
        intersection,
        union,
        missing,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
