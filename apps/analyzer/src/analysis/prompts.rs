// LLM prompt constants for interview preparation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::COMMON_CONSTRAINTS;

/// Output format for the JD + CV overview shown before the interview.
pub const JD_CV_ANALYSIS_FORMAT: &str = "\
You are analyzing a Job Description and a Candidate CV for interview preparation.

{constraints}

OUTPUT FORMAT (STRICT):

Candidate Name:
<name or 'Not explicitly stated'>

Candidate Summary:
- 3-4 bullet points summarizing background and role fit

Key JD Highlights:
- 5 concise bullets capturing role expectations

Top 10 Candidate Skills:
- Bullet list (skills inferred directly from CV)

Top 5 Interview Questions:
- Role-relevant, probing questions";

/// Output format for summarizing an interview transcript against the JD.
pub const TRANSCRIPT_SUMMARY_FORMAT: &str = "\
You are summarizing an interview transcript for the interviewer's notes.

{constraints}
- Quote the candidate only when the transcript contains the exact words

OUTPUT FORMAT (STRICT):

Interview Summary:
- 4-6 bullets covering what the candidate discussed

Evidence Against JD Expectations:
- One bullet per JD expectation the candidate addressed, citing what they said

Topics Not Covered:
- JD expectations the conversation never reached

Suggested Follow-ups:
- Up to 3 questions for a next round";

pub fn build_overview_prompt(jd_text: &str, cv_text: &str) -> String {
    format!(
        "JOB DESCRIPTION:\n{jd_text}\n\nCANDIDATE CV:\n{cv_text}\n\n{}",
        JD_CV_ANALYSIS_FORMAT.replace("{constraints}", COMMON_CONSTRAINTS)
    )
}

pub fn build_transcript_prompt(jd_text: &str, transcript: &str) -> String {
    format!(
        "JOB DESCRIPTION:\n{jd_text}\n\nINTERVIEW TRANSCRIPT:\n{transcript}\n\n{}",
        TRANSCRIPT_SUMMARY_FORMAT.replace("{constraints}", COMMON_CONSTRAINTS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_prompt_layout() {
        let prompt = build_overview_prompt("Senior Analyst", "jane doe, sql");
        assert!(prompt.starts_with("JOB DESCRIPTION:\nSenior Analyst\n\nCANDIDATE CV:\njane doe, sql\n\n"));
        assert!(prompt.contains("Do NOT make hiring decisions"));
        assert!(prompt.contains("Top 5 Interview Questions:"));
        assert!(!prompt.contains("{constraints}"));
    }

    #[test]
    fn test_transcript_prompt_carries_constraints() {
        let prompt = build_transcript_prompt("jd", "q: tell me about sql");
        assert!(prompt.contains("INTERVIEW TRANSCRIPT:\nq: tell me about sql"));
        assert!(prompt.contains("Do NOT assign scores"));
        assert!(!prompt.contains("{constraints}"));
    }
}
