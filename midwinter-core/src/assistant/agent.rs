//! The bounded tool-use loop between a query and the reasoning service.

use super::citations::{extract_citations, Citation};
use super::tools::{ManualTools, ToolDispatcher};
use crate::config::ProfileConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use claude::{Claude, ContentBlock, Message, Request, Response, ToolChoice, ToolResult, ToolUse};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The system prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("prompts/system.txt");

/// Appended to the last tool results when the round ceiling is reached.
pub const FINALIZE_INSTRUCTION: &str = "Now provide your final answer based on all search results.";

/// Returned when the service's final answer has no text.
pub const EMPTY_ANSWER: &str = "No results found.";

/// Anything that can take one exchange of the conversation.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn respond(&self, request: Request) -> std::result::Result<Response, claude::Error>;
}

#[async_trait]
impl ReasoningService for Claude {
    async fn respond(&self, request: Request) -> std::result::Result<Response, claude::Error> {
        self.complete(request).await
    }
}

/// Final answer for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchAnswer {
    pub query: String,
    /// Page citations parsed out of the answer.
    pub results: Vec<Citation>,
    /// The answer text, present only when it cited no pages.
    pub raw_response: Option<String>,
    /// Tool rounds executed.
    pub rounds: usize,
    /// Requests made to the reasoning service.
    pub exchanges: usize,
    pub forced_finalization: bool,
}

impl SearchAnswer {
    fn from_text(query: &str, text: String, rounds: usize, exchanges: usize, forced: bool) -> Self {
        let text = if text.trim().is_empty() {
            EMPTY_ANSWER.to_string()
        } else {
            text
        };
        let results = extract_citations(&text);
        let raw_response = results.is_empty().then_some(text);
        Self {
            query: query.to_string(),
            results,
            raw_response,
            rounds,
            exchanges,
            forced_finalization: forced,
        }
    }

    /// The answer as plain text, rebuilding it from citations when needed.
    pub fn text(&self) -> String {
        match &self.raw_response {
            Some(raw) => raw.clone(),
            None => self
                .results
                .iter()
                .map(|c| format!("**Page {}** [{}] {}", c.page_number, c.section, c.excerpt))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[derive(Debug)]
enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolUse>),
    ForcedFinalization,
    Done(String),
}

/// Runs queries against a reasoning service with the manual tools attached.
pub struct Orchestrator {
    service: Arc<dyn ReasoningService>,
    dispatcher: Arc<ToolDispatcher>,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn ReasoningService>, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            service,
            dispatcher,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn dispatcher(&self) -> &Arc<ToolDispatcher> {
        &self.dispatcher
    }

    /// Answer `query`, letting the service call tools for at most
    /// `profile.round_ceiling` exchanges before it must answer.
    pub async fn run(&self, query: &str, profile: &ProfileConfig) -> Result<SearchAnswer> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        info!(query, model = %profile.model, ceiling = profile.round_ceiling, "search started");

        let mut messages = vec![Message::user(query)];
        let mut exchanges = 0usize;
        let mut rounds = 0usize;
        let mut forced = false;

        let mut state = if profile.round_ceiling == 0 {
            push_instruction(&mut messages);
            LoopState::ForcedFinalization
        } else {
            LoopState::AwaitingModel
        };

        let text = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    let request = self.request(&messages, profile);
                    let response = self.exchange(request, profile).await?;
                    exchanges += 1;
                    if response.wants_tools() {
                        let uses = response.tool_uses();
                        debug!(exchange = exchanges, tools = uses.len(), "service requested tools");
                        messages.push(response.into_message());
                        LoopState::ExecutingTools(uses)
                    } else {
                        LoopState::Done(response.text())
                    }
                }
                LoopState::ExecutingTools(uses) => {
                    let results = self.run_tools(uses).await;
                    rounds += 1;
                    messages.push(Message::tool_results(results));
                    if exchanges >= profile.round_ceiling {
                        warn!(rounds, ceiling = profile.round_ceiling, "round ceiling reached; forcing final answer");
                        push_instruction(&mut messages);
                        LoopState::ForcedFinalization
                    } else {
                        LoopState::AwaitingModel
                    }
                }
                LoopState::ForcedFinalization => {
                    forced = true;
                    let request = self
                        .request(&messages, profile)
                        .with_tool_choice(ToolChoice::None);
                    let response = self.exchange(request, profile).await?;
                    exchanges += 1;
                    LoopState::Done(response.text())
                }
                LoopState::Done(text) => break text,
            };
        };

        info!(query, rounds, exchanges, forced, "search finished");
        Ok(SearchAnswer::from_text(query, text, rounds, exchanges, forced))
    }

    fn request(&self, messages: &[Message], profile: &ProfileConfig) -> Request {
        let mut request = Request::new(messages.to_vec())
            .with_model(&profile.model)
            .with_system(&self.system_prompt)
            .with_max_tokens(profile.max_tokens)
            .with_tools(ManualTools::all());
        if let Some(temp) = profile.temperature {
            request = request.with_temperature(temp);
        }
        request
    }

    async fn exchange(&self, request: Request, profile: &ProfileConfig) -> Result<Response> {
        match tokio::time::timeout(profile.timeout, self.service.respond(request)).await {
            Ok(response) => Ok(response?),
            Err(_) => {
                warn!(timeout = ?profile.timeout, "reasoning service timed out");
                Err(Error::UpstreamTimeout(profile.timeout))
            }
        }
    }

    /// Run every requested tool on the blocking pool; results keep request order.
    async fn run_tools(&self, uses: Vec<ToolUse>) -> Vec<(String, ToolResult)> {
        let handles: Vec<_> = uses
            .into_iter()
            .map(|tool_use| {
                let dispatcher = Arc::clone(&self.dispatcher);
                let id = tool_use.id.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    dispatcher.execute(&tool_use.name, &tool_use.input)
                });
                (id, handle)
            })
            .collect();

        let (ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let outcomes = futures::future::join_all(handles).await;

        ids.into_iter()
            .zip(outcomes)
            .map(|(id, outcome)| {
                let result = outcome.unwrap_or_else(|e| {
                    warn!(tool_use_id = %id, error = %e, "tool task failed");
                    ToolResult::error(format!("Tool execution failed: {e}"))
                });
                (id, result)
            })
            .collect()
    }
}

/// Add the finalize instruction to the trailing user turn.
fn push_instruction(messages: &mut Vec<Message>) {
    let block = ContentBlock::Text {
        text: FINALIZE_INSTRUCTION.to_string(),
    };
    match messages.last_mut() {
        Some(last) if last.role == claude::Role::User => last.content.push(block),
        _ => messages.push(Message::user(FINALIZE_INSTRUCTION)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_without_citations_keeps_raw_text() {
        let answer = SearchAnswer::from_text("q", "Nothing cited.".into(), 1, 2, false);
        assert!(answer.results.is_empty());
        assert_eq!(answer.raw_response.as_deref(), Some("Nothing cited."));
        assert_eq!(answer.text(), "Nothing cited.");
    }

    #[test]
    fn test_answer_with_citations_drops_raw_text() {
        let answer =
            SearchAnswer::from_text("q", "**Page 3** [general] Controls.".into(), 1, 2, false);
        assert_eq!(answer.results.len(), 1);
        assert!(answer.raw_response.is_none());
        assert_eq!(answer.text(), "**Page 3** [general] Controls.");
    }

    #[test]
    fn test_empty_answer_text() {
        let answer = SearchAnswer::from_text("q", "  ".into(), 0, 1, false);
        assert_eq!(answer.raw_response.as_deref(), Some(EMPTY_ANSWER));
    }

    #[test]
    fn test_instruction_joins_user_turn() {
        let mut messages = vec![Message::user("hello")];
        push_instruction(&mut messages);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content.len(), 2);

        let mut messages = vec![Message::assistant("hi")];
        push_instruction(&mut messages);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_default_prompt_mentions_tools() {
        for tool in ManualTools::all() {
            assert!(
                DEFAULT_SYSTEM_PROMPT.contains(&tool.name),
                "prompt should mention {}",
                tool.name
            );
        }
    }
}
