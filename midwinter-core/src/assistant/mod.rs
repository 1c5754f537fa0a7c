//! Tool registry, dispatch, and the reasoning loop that drives them.

mod agent;
mod citations;
mod tools;

pub use agent::{
    Orchestrator, ReasoningService, SearchAnswer, DEFAULT_SYSTEM_PROMPT, EMPTY_ANSWER,
    FINALIZE_INSTRUCTION,
};
pub use citations::{extract_citations, Citation, MAX_EXCERPT_CHARS};
pub use tools::{validate, ManualTools, ToolDispatcher};
