//! QA tests for the tool-use loop, driven by a scripted reasoning service.
//!
//! Run with: `cargo test -p midwinter-core --test qa_orchestration`

use claude::{ContentBlock, Role, ToolChoice};
use midwinter_core::assistant::{ToolDispatcher, FINALIZE_INSTRUCTION};
use midwinter_core::testing::sample_reference_data;
use midwinter_core::{Error, ErrorKind, MockReasoner, MockReply, Orchestrator, ProfileConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(mock: Arc<MockReasoner>) -> Orchestrator {
    let (retrieval, graph) = sample_reference_data().into_stores(2).unwrap();
    let dispatcher = Arc::new(ToolDispatcher::new(Arc::new(retrieval), Arc::new(graph)));
    Orchestrator::new(mock, dispatcher)
}

fn profile(ceiling: usize) -> ProfileConfig {
    ProfileConfig::new("mock-model", 512, ceiling).with_timeout(Duration::from_secs(5))
}

fn tool_result_blocks(content: &[ContentBlock]) -> Vec<(&str, bool)> {
    content
        .iter()
        .filter_map(|b| match b {
            ContentBlock::ToolResult {
                content, is_error, ..
            } => Some((content.as_str(), *is_error)),
            _ => None,
        })
        .collect()
}

// =============================================================================
// TERMINATION
// =============================================================================

#[tokio::test]
async fn test_direct_answer() {
    let mock = Arc::new(MockReasoner::new(vec![MockReply::text(
        "**Page 90** [equipment] Launch the glider from high ground.",
    )]));
    let answer = orchestrator(Arc::clone(&mock))
        .run("How do I fly?", &profile(5))
        .await
        .unwrap();

    assert_eq!(answer.exchanges, 1);
    assert_eq!(answer.rounds, 0);
    assert!(!answer.forced_finalization);
    assert_eq!(answer.results[0].page_number, 90);
    assert_eq!(answer.results[0].section, "equipment");

    let request = &mock.requests()[0];
    assert_eq!(request.model.as_deref(), Some("mock-model"));
    assert_eq!(request.tools.as_ref().map(Vec::len), Some(10));
    assert!(request.system.is_some());
}

#[tokio::test]
async fn test_tool_loop_then_answer() {
    let mock = Arc::new(MockReasoner::new(vec![
        MockReply::tool("search_manual", json!({"query": "glider"})),
        MockReply::tool("show_page", json!({"page_number": 90})),
        MockReply::text("**Page 90** [equipment] Use high ground."),
    ]));
    let answer = orchestrator(Arc::clone(&mock))
        .run("glider?", &profile(5))
        .await
        .unwrap();

    assert_eq!(answer.exchanges, 3);
    assert_eq!(answer.rounds, 2);
    assert!(!answer.forced_finalization);

    let requests = mock.requests();
    let last = requests.last().unwrap();
    // user, assistant tool call, user results, assistant tool call, user results
    assert_eq!(last.messages.len(), 5);
    let results = tool_result_blocks(&last.messages[2].content);
    assert_eq!(results.len(), 1);
    assert!(results[0].0.starts_with("Found 1 results for 'glider':"));
    assert!(!results[0].1);
}

#[tokio::test]
async fn test_always_tools_is_forced_to_finish() {
    let mock = Arc::new(MockReasoner::always_tools(
        "search_manual",
        json!({"query": "snow"}),
    ));
    let ceiling = 3;
    let answer = orchestrator(Arc::clone(&mock))
        .run("snow?", &profile(ceiling))
        .await
        .unwrap();

    assert!(answer.forced_finalization);
    assert_eq!(answer.rounds, ceiling);
    assert_eq!(answer.exchanges, ceiling + 1);
    assert_eq!(mock.request_count(), ceiling + 1);

    let requests = mock.requests();
    let (last, earlier) = requests.split_last().unwrap();
    assert_eq!(last.tool_choice, Some(ToolChoice::None));
    assert!(earlier.iter().all(|r| r.tool_choice.is_none()));

    let final_turn = last.messages.last().unwrap();
    assert_eq!(final_turn.role, Role::User);
    assert!(matches!(
        final_turn.content.last(),
        Some(ContentBlock::Text { text }) if text == FINALIZE_INSTRUCTION
    ));
}

#[tokio::test]
async fn test_zero_ceiling_answers_without_tools() {
    let mock = Arc::new(MockReasoner::always_tools(
        "search_manual",
        json!({"query": "snow"}),
    ));
    let answer = orchestrator(Arc::clone(&mock))
        .run("snow?", &profile(0))
        .await
        .unwrap();

    assert_eq!(answer.exchanges, 1);
    assert_eq!(answer.rounds, 0);
    assert!(answer.forced_finalization);
    assert_eq!(mock.requests()[0].tool_choice, Some(ToolChoice::None));
}

// =============================================================================
// TOOL FAILURES
// =============================================================================

#[tokio::test]
async fn test_tool_errors_go_back_to_the_model() {
    let mock = Arc::new(MockReasoner::new(vec![
        MockReply::ToolCalls(vec![
            ("show_page".into(), json!({"page_number": 999})),
            ("unknown_tool".into(), json!({})),
            ("get_friends".into(), json!({})),
        ]),
        MockReply::text("I could not find that page."),
    ]));
    let answer = orchestrator(Arc::clone(&mock))
        .run("page 999?", &profile(5))
        .await
        .unwrap();
    assert_eq!(answer.raw_response.as_deref(), Some("I could not find that page."));

    let requests = mock.requests();
    let results = tool_result_blocks(&requests[1].messages[2].content);
    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0],
        ("Page 999 not found. Valid pages are 1-196.", true)
    );
    assert_eq!(results[1], ("Unknown tool: unknown_tool", false));
    assert!(results[2].1);
}

#[tokio::test]
async fn test_tool_results_keep_request_order() {
    let mock = Arc::new(MockReasoner::new(vec![
        MockReply::ToolCalls(vec![
            ("show_page".into(), json!({"page_number": 3})),
            ("show_page".into(), json!({"page_number": 130})),
            ("show_page".into(), json!({"page_number": 25})),
        ]),
        MockReply::text("done"),
    ]));
    orchestrator(Arc::clone(&mock))
        .run("pages", &profile(5))
        .await
        .unwrap();

    let requests = mock.requests();
    let ids: Vec<_> = requests[1].messages[2]
        .content
        .iter()
        .filter_map(|b| match b {
            ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, ["toolu_mock_0", "toolu_mock_1", "toolu_mock_2"]);

    let results = tool_result_blocks(&requests[1].messages[2].content);
    assert!(results[0].0.starts_with("=== Page 3 [general] ==="));
    assert!(results[1].0.starts_with("=== Page 130 [location] ==="));
    assert!(results[2].0.starts_with("=== Page 25 [character] ==="));
}

// =============================================================================
// UPSTREAM FAILURES
// =============================================================================

#[tokio::test]
async fn test_upstream_error_fails_the_query() {
    let mock = Arc::new(MockReasoner::new(vec![MockReply::Error("overloaded".into())]));
    let err = orchestrator(mock).run("q", &profile(5)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let mock = Arc::new(MockReasoner::new(vec![MockReply::Delayed(
        Duration::from_secs(2),
        "too late".into(),
    )]));
    let profile = profile(5).with_timeout(Duration::from_millis(50));
    let err = orchestrator(mock).run("q", &profile).await.unwrap_err();
    assert!(matches!(err, Error::UpstreamTimeout(_)));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let mock = Arc::new(MockReasoner::new(Vec::new()));
    let err = orchestrator(Arc::clone(&mock))
        .run("   ", &profile(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyQuery));
    assert_eq!(mock.request_count(), 0);
}
