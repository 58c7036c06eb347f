// Shared prompt fragments. Each feature that needs LLM calls keeps its own
// prompts.rs alongside it; only cross-cutting rules live here.

/// Rules appended to every analysis prompt.
pub const COMMON_CONSTRAINTS: &str = "\
NON-NEGOTIABLE RULES:
- Be concise and factual
- Do NOT assign scores
- Do NOT make hiring decisions
- Do NOT invent information
- Use only CV and JD content";

/// System instruction shared by all interview-preparation calls.
pub const INTERVIEW_ASSISTANT_SYSTEM: &str = "You are an interview preparation assistant \
    supporting a human interviewer. You summarize documents you are given. \
    You never score candidates and never recommend hiring decisions.";
