//! Interviewer insight. Turns an alignment report into a short paragraph
//! pointing the interviewer at what to explore.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::analysis::alignment::AlignmentReport;

const CLOSING_SENTENCE: &str = "These areas should be explored further during the interview \
    to validate depth, ownership, and hands-on involvement.";

#[derive(Debug, Clone, Serialize)]
pub struct InterviewerInsight {
    /// Every dictionary keyword seen in either document.
    pub role_focus: Vec<String>,
    pub cv_matches: Vec<String>,
    pub cv_gaps: Vec<String>,
    pub explanation: String,
}

pub fn build_insight(report: &AlignmentReport) -> InterviewerInsight {
    let mut focus = BTreeSet::new();
    let mut matches = BTreeSet::new();
    let mut gaps = BTreeSet::new();

    for detail in &report.buckets {
        focus.extend(detail.union.iter().copied());
        matches.extend(detail.intersection.iter().copied());
        gaps.extend(detail.missing.iter().copied());
    }

    let role_focus = to_sorted_vec(focus);
    let cv_matches = to_sorted_vec(matches);
    let cv_gaps = to_sorted_vec(gaps);

    let mut sentences = Vec::with_capacity(4);
    if !role_focus.is_empty() {
        sentences.push(format!("The role emphasises {}.", role_focus.join(", ")));
    }
    if !cv_matches.is_empty() {
        sentences.push(format!(
            "The CV demonstrates clear experience in {}.",
            cv_matches.join(", ")
        ));
    }
    if !cv_gaps.is_empty() {
        sentences.push(format!(
            "However, the CV does not clearly surface evidence of {}, which are explicitly referenced in the job description.",
            cv_gaps.join(", ")
        ));
    }
    sentences.push(CLOSING_SENTENCE.to_string());

    InterviewerInsight {
        role_focus,
        cv_matches,
        cv_gaps,
        explanation: sentences.join(" "),
    }
}

fn to_sorted_vec(set: BTreeSet<&str>) -> Vec<String> {
    set.into_iter().map(String::from).collect()
}
