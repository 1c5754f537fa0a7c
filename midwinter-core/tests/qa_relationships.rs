//! QA tests for the relationship tools over the curated Midwinter cast.
//!
//! Run with: `cargo test -p midwinter-core --test qa_relationships`

use midwinter_core::assistant::ToolDispatcher;
use midwinter_core::relationships::{RecruitDecision, RelationshipGraph, Sentiment};
use midwinter_core::testing::sample_reference_data;
use midwinter_core::ErrorKind;
use serde_json::json;
use std::sync::Arc;

fn graph() -> RelationshipGraph {
    sample_reference_data().into_stores(1).unwrap().1
}

fn dispatcher() -> ToolDispatcher {
    let (retrieval, graph) = sample_reference_data().into_stores(1).unwrap();
    ToolDispatcher::new(Arc::new(retrieval), Arc::new(graph))
}

// =============================================================================
// RECRUITMENT
// =============================================================================

#[test]
fn test_friend_can_recruit() {
    let verdict = graph()
        .can_recruit("Captain John Stark", "Karl Rudzinski")
        .unwrap();
    assert_eq!(verdict.decision, RecruitDecision::Yes(vec!["friend".to_string()]));
}

#[test]
fn test_short_names_resolve_for_recruitment() {
    let verdict = graph().can_recruit("Stark", "Courtenay").unwrap();
    assert_eq!(verdict.target, "Lieutenant Howard Courtenay");
    assert_eq!(
        verdict.to_string(),
        "=== Can Captain John Stark recruit Lieutenant Howard Courtenay? ===\n\nYES - Captain John Stark is friend with Lieutenant Howard Courtenay"
    );
}

#[test]
fn test_enemy_blocks_recruitment() {
    let text = dispatcher()
        .dispatch(
            "can_recruit",
            &json!({"recruiter": "Karl Rudzinski", "target": "Franco Grazzini"}),
        )
        .unwrap();
    assert_eq!(
        text,
        "=== Can Karl Rudzinski recruit Franco Grazzini? ===\n\nNO - Franco Grazzini hates Karl Rudzinski"
    );
}

#[test]
fn test_recruitment_is_directional() {
    let graph = graph();

    let forward = graph
        .can_recruit("Captain John Stark", "Sergeant Victor Grice")
        .unwrap();
    assert_eq!(forward.decision, RecruitDecision::No(vec!["resents".to_string()]));

    let backward = graph
        .can_recruit("Sergeant Victor Grice", "Captain John Stark")
        .unwrap();
    assert_eq!(backward.decision, RecruitDecision::Unknown);
    assert!(backward.to_string().contains("UNKNOWN - No direct relationship found"));
}

#[test]
fn test_partial_names_resolve() {
    let verdict = graph().can_recruit("stark", "rudzinski").unwrap();
    assert_eq!(verdict.recruiter, "Captain John Stark");
    assert_eq!(verdict.target, "Karl Rudzinski");
}

#[test]
fn test_unknown_character() {
    let result = dispatcher().execute(
        "can_recruit",
        &json!({"recruiter": "Stark", "target": "Nobody Atall"}),
    );
    assert!(result.is_error);
    assert_eq!(result.content, "Character 'Nobody Atall' not found");
}

#[test]
fn test_who_can_recruit_lists_outgoing_edges() {
    let report = graph().who_can_recruit("Davy Hart").unwrap();
    let names: Vec<_> = report.can_recruit.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Professor Olaf Kristiansen",
            "Konrad Rudel",
            "Jenny Adams",
            "Virginia Caygill"
        ]
    );
    assert!(report.cannot_recruit.is_empty());

    let text = report.to_string();
    assert!(text.starts_with("=== Who can recruit Davy Hart? ===\n"));
    assert!(text.contains("\n  - Konrad Rudel (hero)"));
    assert!(text.ends_with("CANNOT RECRUIT: No enemies listed"));
}

#[test]
fn test_character_without_edges() {
    let graph = graph();
    let report = graph.who_can_recruit("Mrs Amelia Randles").unwrap();
    assert!(report.can_recruit.is_empty());
    assert!(report.cannot_recruit.is_empty());
    assert!(report
        .to_string()
        .contains("CAN RECRUIT: No specific friends listed"));

    let circle = graph.friends("Amelia").unwrap();
    assert_eq!(circle.to_string(), "=== Friends of Mrs Amelia Randles ===\n\nNo friends found!");
}

// =============================================================================
// SOCIAL CIRCLES
// =============================================================================

#[test]
fn test_friends_both_directions() {
    let circle = graph().friends("Jenny Adams").unwrap();
    assert_eq!(circle.sentiment, Sentiment::Positive);
    assert!(circle.outgoing.iter().any(|l| l.name == "Nurse Sarah Maddocks"));
    assert!(circle.incoming.iter().any(|l| l.name == "Davy Hart"));

    let text = circle.to_string();
    assert!(text.starts_with("=== Friends of Jenny Adams ===\n\nJenny Adams LIKES:"));
    assert!(text.contains("\n\nLIKED BY:\n  - Virginia Caygill (teacher)\n  - Davy Hart (boyfriend)"));
}

#[test]
fn test_enemies_of_chabrun() {
    let circle = graph().enemies("Chabrun").unwrap();
    let haters: Vec<_> = circle.incoming.iter().map(|l| l.name.as_str()).collect();
    assert!(haters.contains(&"Sergeant Victor Grice"));
    assert!(haters.contains(&"Constable Bill Doughty"));
    assert!(circle.to_string().contains("DISLIKED BY:"));
}

#[test]
fn test_tools_report_missing_arguments() {
    let err = dispatcher()
        .dispatch("get_friends", &json!({}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
