// Interview preparation: CV/JD alignment scoring, interviewer insight,
// and LLM overviews. All LLM calls go through llm_client.

pub mod alignment;
pub mod handlers;
pub mod insight;
pub mod keywords;
pub mod overview;
pub mod prompts;
