//! QA tests for manual retrieval through the tool surface.
//!
//! These run against the 196-page sample manual and need no API key.
//!
//! Run with: `cargo test -p midwinter-core --test qa_retrieval`

use midwinter_core::assistant::ToolDispatcher;
use midwinter_core::corpus::SectionType;
use midwinter_core::retrieval::{RetrievalEngine, SearchTier, MAX_SEARCH_RESULTS};
use midwinter_core::testing::{sample_reference_data, SAMPLE_PAGE_COUNT};
use midwinter_core::{Error, ErrorKind};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn dispatcher() -> ToolDispatcher {
    let (retrieval, graph) = sample_reference_data().into_stores(2).unwrap();
    ToolDispatcher::new(Arc::new(retrieval), Arc::new(graph))
}

fn engine() -> RetrievalEngine {
    sample_reference_data().into_stores(2).unwrap().0
}

// =============================================================================
// PAGE LOOKUP
// =============================================================================

#[test]
fn test_every_page_is_reachable() {
    let engine = engine();
    for n in 1..=SAMPLE_PAGE_COUNT {
        let page = engine.show_page(i64::from(n)).unwrap();
        assert_eq!(page.page_number, n);
    }
}

#[test]
fn test_show_page_renders_header() {
    let text = dispatcher()
        .dispatch("show_page", &json!({"page_number": 90}))
        .unwrap();
    assert!(text.starts_with("=== Page 90 [equipment] ===\n\n"));
    assert!(text.contains("hang glider"));
}

#[test]
fn test_show_page_out_of_range() {
    let engine = engine();
    for page in [0, 197, -1] {
        let err = engine.show_page(page).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            format!("Page {page} not found. Valid pages are 1-196.")
        );
    }
}

#[test]
fn test_show_page_rejects_text_page_number() {
    let result = dispatcher().execute("show_page", &json!({"page_number": "ninety"}));
    assert!(result.is_error);
}

// =============================================================================
// SEARCH
// =============================================================================

#[test]
fn test_search_results_are_capped() {
    let results = engine().search_manual("snow").unwrap();
    assert_eq!(results.tier, Some(SearchTier::Ranked));
    assert_eq!(results.hits.len(), MAX_SEARCH_RESULTS);
}

#[test]
fn test_ranked_search_finds_the_glider() {
    let results = engine().search_manual("glider").unwrap();
    assert_eq!(results.hits.len(), 1);
    assert_eq!(results.hits[0].page_number, 90);
    assert!(results.hits[0].snippet.contains(">>>"));
}

#[test]
fn test_malformed_query_uses_substring_tier() {
    let results = engine().search_manual("glider AND").unwrap();
    assert_eq!(results.tier, Some(SearchTier::Substring));
    assert!(!results.hits.is_empty());
    assert!(results.hits.len() <= MAX_SEARCH_RESULTS);
    assert!(results.hits.iter().all(|h| h.score.is_none()));
}

#[test]
fn test_unmatched_token_uses_substring_tier() {
    let results = engine().search_manual("glid").unwrap();
    assert_eq!(results.tier, Some(SearchTier::Substring));
    let pages: Vec<_> = results.hits.iter().map(|h| h.page_number).collect();
    assert_eq!(pages, [90]);
    assert!(results.hits[0].snippet.starts_with("The hang glider"));
}

#[test]
fn test_unmatched_conjunction_uses_capped_substring_tier() {
    // No page mentions both words, so the ranked tier has no rows.
    let results = engine().search_manual("glider snow").unwrap();
    assert_eq!(results.tier, Some(SearchTier::Substring));
    assert_eq!(results.hits.len(), MAX_SEARCH_RESULTS);
    let pages: Vec<_> = results.hits.iter().map(|h| h.page_number).collect();
    // Page 3 is the only early page that mentions neither word.
    let expected: Vec<u32> = (1..=16).filter(|&n| n != 3).collect();
    assert_eq!(pages, expected);
}

#[test]
fn test_oversized_page_number_is_rejected() {
    let err = dispatcher()
        .dispatch("show_page", &json!({"page_number": u64::MAX}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!err.to_string().contains("Page 0"));
}

#[test]
fn test_no_results_message() {
    let text = dispatcher()
        .dispatch("search_manual", &json!({"query": "xylophone"}))
        .unwrap();
    assert_eq!(
        text,
        "No results found for 'xylophone'. Try different keywords or check spelling."
    );
}

#[test]
fn test_filter_by_section_scopes_hits() {
    let results = engine().filter_by_section("locations", "snow").unwrap();
    assert!(!results.hits.is_empty());
    assert!(results
        .hits
        .iter()
        .all(|h| h.section_type == SectionType::Location));
    assert!(results
        .to_string()
        .starts_with(&format!("Found {} results for 'snow' in locations:", results.hits.len())));
}

#[test]
fn test_filter_by_unknown_section() {
    let err = engine().filter_by_section("weapons", "rifle").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        Error::InvalidSection { section, valid } => {
            assert_eq!(section, "weapons");
            assert_eq!(
                valid,
                "characters, equipment, locations, story_sections, general_content"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_section_listing_covers_manual() {
    let listing = engine().list_sections();
    assert_eq!(listing.total_pages(), SAMPLE_PAGE_COUNT as usize);
}

// =============================================================================
// ENTITIES
// =============================================================================

#[test]
fn test_quick_search_finds_character() {
    let text = dispatcher()
        .dispatch("quick_search", &json!({"query": "stark"}))
        .unwrap();
    assert!(text.starts_with("=== CHARACTERS ==="));
    assert!(text.contains("**Captain John Stark**"));
    assert!(text.contains("  Occupation: Commander of the Peace Force"));
}

#[test]
fn test_quick_search_across_kinds() {
    let text = dispatcher()
        .dispatch("quick_search", &json!({"query": "glid"}))
        .unwrap();
    assert!(text.contains("=== SKILLS ==="));
    assert!(text.contains("**Hang Gliding**"));
}

#[test]
fn test_list_entities_counts() {
    let text = dispatcher().dispatch("list_entities", &json!({})).unwrap();
    assert!(text.contains("=== BUILDINGS (2) ==="));
    assert!(text.contains("=== ENEMY VEHICLES (2) ==="));
    assert!(text.contains("=== SKILLS (1) ==="));
}

// =============================================================================
// PROPERTIES
// =============================================================================

const WORDS: [&str; 8] = [
    "snow", "glider", "island", "Midwinter", "station", "reference", "buggy", "Masters",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_search_is_capped_and_ordered(
        words in prop::collection::vec(prop::sample::select(WORDS.to_vec()), 1..3),
        section in prop::option::of(prop::sample::select(SectionType::ALL.to_vec())),
    ) {
        let engine = engine();
        let query = words.join(" ");
        let results = match section {
            Some(s) => engine.filter_by_section(s.section_name(), &query).unwrap(),
            None => engine.search_manual(&query).unwrap(),
        };

        prop_assert!(results.hits.len() <= MAX_SEARCH_RESULTS);
        if let Some(s) = section {
            prop_assert!(results.hits.iter().all(|h| h.section_type == s));
        }
        match results.tier {
            Some(SearchTier::Ranked) => {
                let scores: Vec<f64> = results.hits.iter().filter_map(|h| h.score).collect();
                prop_assert_eq!(scores.len(), results.hits.len());
                prop_assert!(scores.windows(2).all(|w| w[0] <= w[1]));
            }
            Some(SearchTier::Substring) => {
                prop_assert!(results.hits.windows(2).all(|w| w[0].page_number < w[1].page_number));
            }
            None => prop_assert!(results.hits.is_empty()),
        }
    }
}
