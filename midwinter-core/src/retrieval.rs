//! Tiered manual search and the lookup operations the tools expose.
//!
//! Search runs an ordered list of strategies and stops at the first one that
//! produces rows. A strategy that reports itself unavailable is skipped.

use crate::corpus::{CorpusStore, Page, SectionListing, SectionType};
use crate::entities::{EntityIndex, EntityListing, EntityMatches};
use crate::error::{Error, ErrorKind, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on rows returned by any search tier.
pub const MAX_SEARCH_RESULTS: usize = 15;

/// Characters of page content shown for a substring hit.
pub const FALLBACK_SNIPPET_CHARS: usize = 500;

/// Which strategy produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTier {
    Ranked,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub page_number: u32,
    pub section_type: SectionType,
    pub snippet: String,
    /// Present for ranked hits only; lower is better.
    pub score: Option<f64>,
}

/// One way of turning a query into page hits.
pub trait SearchStrategy: Send + Sync {
    fn tier(&self) -> SearchTier;

    /// Return at most `limit` hits, best first. `Error::Unavailable` means
    /// "try the next strategy".
    fn search(
        &self,
        corpus: &CorpusStore,
        query: &str,
        section: Option<SectionType>,
        limit: usize,
    ) -> Result<Vec<SearchHit>>;
}

/// Tier 1: BM25-ranked full-text search.
pub struct RankedIndexSearch;

impl SearchStrategy for RankedIndexSearch {
    fn tier(&self) -> SearchTier {
        SearchTier::Ranked
    }

    fn search(
        &self,
        corpus: &CorpusStore,
        query: &str,
        section: Option<SectionType>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let rows = corpus.index()?.search(query, section, limit)?;
        rows.into_iter()
            .map(|row| {
                let page = corpus.page(i64::from(row.page_number))?;
                Ok(SearchHit {
                    page_number: row.page_number,
                    section_type: page.section_type,
                    snippet: row.snippet,
                    score: Some(row.score),
                })
            })
            .collect()
    }
}

/// Tier 2: any query word longer than two characters, as a case-insensitive
/// substring, in page order.
pub struct SubstringScan;

impl SubstringScan {
    fn words(query: &str) -> Vec<String> {
        query
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .map(str::to_lowercase)
            .collect()
    }
}

impl SearchStrategy for SubstringScan {
    fn tier(&self) -> SearchTier {
        SearchTier::Substring
    }

    fn search(
        &self,
        corpus: &CorpusStore,
        query: &str,
        section: Option<SectionType>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let words = Self::words(query);
        if words.is_empty() {
            return Ok(Vec::new());
        }

        Ok(corpus
            .pages()
            .iter()
            .filter(|p| section.map_or(true, |s| p.section_type == s))
            .filter(|p| {
                let content = p.content.to_lowercase();
                words.iter().any(|w| content.contains(w.as_str()))
            })
            .take(limit)
            .map(|p| SearchHit {
                page_number: p.page_number,
                section_type: p.section_type,
                snippet: p.content.chars().take(FALLBACK_SNIPPET_CHARS).collect(),
                score: None,
            })
            .collect())
    }
}

/// Hits for one query, ready to render for the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    /// The user-facing section name when the search was scoped.
    pub section: Option<String>,
    pub tier: Option<SearchTier>,
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl fmt::Display for SearchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.section, self.hits.is_empty()) {
            (None, true) => {
                return write!(
                    f,
                    "No results found for '{}'. Try different keywords or check spelling.",
                    self.query
                )
            }
            (Some(section), true) => {
                return write!(f, "No results for '{}' in {} section.", self.query, section)
            }
            (None, false) => writeln!(
                f,
                "Found {} results for '{}':",
                self.hits.len(),
                self.query
            )?,
            (Some(section), false) => writeln!(
                f,
                "Found {} results for '{}' in {}:",
                self.hits.len(),
                self.query,
                section
            )?,
        }

        for hit in &self.hits {
            write!(
                f,
                "\n**Page {}** [{}]\n  {}\n",
                hit.page_number, hit.section_type, hit.snippet
            )?;
        }
        Ok(())
    }
}

/// Read-only operations over the corpus and entity tables.
pub struct RetrievalEngine {
    corpus: Arc<CorpusStore>,
    entities: Arc<EntityIndex>,
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl RetrievalEngine {
    /// Ranked search first, substring scan as fallback.
    pub fn new(corpus: Arc<CorpusStore>, entities: Arc<EntityIndex>) -> Self {
        let strategies: Vec<Box<dyn SearchStrategy>> =
            vec![Box::new(RankedIndexSearch), Box::new(SubstringScan)];
        Self::with_strategies(corpus, entities, strategies)
    }

    pub fn with_strategies(
        corpus: Arc<CorpusStore>,
        entities: Arc<EntityIndex>,
        strategies: Vec<Box<dyn SearchStrategy>>,
    ) -> Self {
        Self {
            corpus,
            entities,
            strategies,
        }
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    pub fn search_manual(&self, query: &str) -> Result<SearchResults> {
        let (tier, hits) = self.run_tiers(query, None)?;
        Ok(SearchResults {
            query: query.to_string(),
            section: None,
            tier,
            hits,
        })
    }

    /// Search restricted to one section, named as the tools name it
    /// (`characters`, `story_sections`, ...).
    pub fn filter_by_section(&self, section: &str, query: &str) -> Result<SearchResults> {
        let tag = SectionType::from_section_name(section).ok_or_else(|| Error::InvalidSection {
            section: section.to_string(),
            valid: SectionType::valid_section_names(),
        })?;
        let (tier, hits) = self.run_tiers(query, Some(tag))?;
        Ok(SearchResults {
            query: query.to_string(),
            section: Some(section.to_string()),
            tier,
            hits,
        })
    }

    pub fn show_page(&self, page_number: i64) -> Result<&Page> {
        self.corpus.page(page_number)
    }

    pub fn quick_search(&self, query: &str) -> EntityMatches<'_> {
        self.entities.quick_search(query)
    }

    pub fn list_sections(&self) -> SectionListing {
        self.corpus.sections()
    }

    pub fn list_entities(&self) -> EntityListing {
        self.entities.listing()
    }

    fn run_tiers(
        &self,
        query: &str,
        section: Option<SectionType>,
    ) -> Result<(Option<SearchTier>, Vec<SearchHit>)> {
        for strategy in &self.strategies {
            match strategy.search(&self.corpus, query, section, MAX_SEARCH_RESULTS) {
                Ok(hits) if !hits.is_empty() => {
                    debug!(tier = ?strategy.tier(), hits = hits.len(), query, "search answered");
                    return Ok((Some(strategy.tier()), hits));
                }
                Ok(_) => {
                    debug!(tier = ?strategy.tier(), query, "no rows; trying next tier");
                }
                Err(e) if e.kind() == ErrorKind::Unavailable => {
                    debug!(tier = ?strategy.tier(), error = %e, query, "tier unavailable; trying next tier");
                }
                Err(e) => return Err(e),
            }
        }
        Ok((None, Vec::new()))
    }
}
