//! The paginated manual and its full-text index.

mod index;

pub use index::{FtsIndex, RankedRow, DEFAULT_POOL_SIZE};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Section tag attached to every manual page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Character,
    Equipment,
    Location,
    Story,
    General,
}

impl SectionType {
    /// All tags, in declaration order.
    pub const ALL: [SectionType; 5] = [
        SectionType::Character,
        SectionType::Equipment,
        SectionType::Location,
        SectionType::Story,
        SectionType::General,
    ];

    /// The tag as stored alongside page content.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Character => "character",
            SectionType::Equipment => "equipment",
            SectionType::Location => "location",
            SectionType::Story => "story",
            SectionType::General => "general",
        }
    }

    /// Parse a stored tag (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "character" => Some(SectionType::Character),
            "equipment" => Some(SectionType::Equipment),
            "location" => Some(SectionType::Location),
            "story" => Some(SectionType::Story),
            "general" => Some(SectionType::General),
            _ => None,
        }
    }

    /// The user-facing section name that selects this tag.
    pub fn section_name(&self) -> &'static str {
        match self {
            SectionType::Character => "characters",
            SectionType::Equipment => "equipment",
            SectionType::Location => "locations",
            SectionType::Story => "story_sections",
            SectionType::General => "general_content",
        }
    }

    /// Map a user-facing section name (`characters`, `story_sections`, ...) to its tag.
    pub fn from_section_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.section_name() == name)
    }

    /// Comma-separated list of every valid section name.
    pub fn valid_section_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.section_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of the manual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub section_type: SectionType,
    pub content: String,
}

impl Page {
    pub fn new(page_number: u32, section_type: SectionType, content: impl Into<String>) -> Self {
        Self {
            page_number,
            section_type,
            content: content.into(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "=== Page {} [{}] ===\n\n{}",
            self.page_number, self.section_type, self.content
        )
    }
}

/// Page statistics for one section tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub section_type: SectionType,
    pub count: usize,
    pub first_page: u32,
    pub last_page: u32,
}

/// Per-section page counts, ordered by first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionListing {
    pub sections: Vec<SectionSummary>,
}

impl SectionListing {
    pub fn total_pages(&self) -> usize {
        self.sections.iter().map(|s| s.count).sum()
    }
}

impl fmt::Display for SectionListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== MANUAL SECTIONS ===")?;
        for s in &self.sections {
            write!(
                f,
                "\n**{}**: {} pages (pp. {}-{})",
                s.section_type, s.count, s.first_page, s.last_page
            )?;
        }
        write!(f, "\n\n**Total: {} pages**", self.total_pages())
    }
}

/// Immutable manual pages plus an optional ranked index.
///
/// Pages are held in page order; page `n` lives at position `n - 1`.
pub struct CorpusStore {
    pages: Vec<Page>,
    index: Option<FtsIndex>,
}

impl CorpusStore {
    /// Validate the pages and build the full-text index over them.
    ///
    /// An index that fails to build leaves the store usable; ranked search
    /// reports itself unavailable and callers fall back to substring search.
    pub fn new(pages: Vec<Page>, pool_size: usize) -> Result<Self> {
        let pages = validate_pages(pages)?;
        let index = match FtsIndex::build(&pages, pool_size) {
            Ok(index) => Some(index),
            Err(e) => {
                warn!(error = %e, "full-text index unavailable; substring search only");
                None
            }
        };
        info!(
            pages = pages.len(),
            indexed = index.is_some(),
            "corpus loaded"
        );
        Ok(Self { pages, index })
    }

    /// Build a store with no ranked index.
    pub fn without_index(pages: Vec<Page>) -> Result<Self> {
        Ok(Self {
            pages: validate_pages(pages)?,
            index: None,
        })
    }

    /// Look up one page by number.
    pub fn page(&self, page_number: i64) -> Result<&Page> {
        usize::try_from(page_number)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.pages.get(i))
            .ok_or(Error::PageNotFound {
                page: page_number,
                first: 1,
                last: self.last_page(),
            })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn last_page(&self) -> u32 {
        self.pages.last().map(|p| p.page_number).unwrap_or(0)
    }

    /// The ranked index, or `Unavailable` when it could not be built.
    pub fn index(&self) -> Result<&FtsIndex> {
        self.index
            .as_ref()
            .ok_or_else(|| Error::Unavailable("full-text index was not built".to_string()))
    }

    /// Page counts and ranges per section tag, ordered by first page.
    pub fn sections(&self) -> SectionListing {
        let mut by_tag: BTreeMap<SectionType, SectionSummary> = BTreeMap::new();
        for page in &self.pages {
            by_tag
                .entry(page.section_type)
                .and_modify(|s| {
                    s.count += 1;
                    s.first_page = s.first_page.min(page.page_number);
                    s.last_page = s.last_page.max(page.page_number);
                })
                .or_insert(SectionSummary {
                    section_type: page.section_type,
                    count: 1,
                    first_page: page.page_number,
                    last_page: page.page_number,
                });
        }

        let mut sections: Vec<_> = by_tag.into_values().collect();
        sections.sort_by_key(|s| s.first_page);
        SectionListing { sections }
    }
}

/// Sort pages and enforce unique, dense numbering starting at 1.
fn validate_pages(mut pages: Vec<Page>) -> Result<Vec<Page>> {
    if pages.is_empty() {
        return Err(Error::Load("corpus contains no pages".to_string()));
    }
    pages.sort_by_key(|p| p.page_number);
    for (i, page) in pages.iter().enumerate() {
        let expected = i as u32 + 1;
        if page.page_number != expected {
            return Err(Error::Load(format!(
                "page numbers must be unique and contiguous from 1: expected {expected}, found {}",
                page.page_number
            )));
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<Page> {
        vec![
            Page::new(2, SectionType::Character, "Captain John Stark"),
            Page::new(1, SectionType::General, "Introduction"),
            Page::new(3, SectionType::Character, "Nurse Sarah Maddocks"),
            Page::new(4, SectionType::Equipment, "Rifle"),
        ]
    }

    #[test]
    fn test_pages_are_sorted_and_addressable() {
        let store = CorpusStore::without_index(pages()).unwrap();
        assert_eq!(store.page_count(), 4);
        assert_eq!(store.page(2).unwrap().content, "Captain John Stark");
        assert_eq!(store.page(1).unwrap().section_type, SectionType::General);
    }

    #[test]
    fn test_out_of_range_pages() {
        let store = CorpusStore::without_index(pages()).unwrap();
        for n in [0, -1, 5, i64::MAX] {
            let err = store.page(n).unwrap_err();
            assert!(matches!(err, Error::PageNotFound { last: 4, .. }), "{n}");
        }
    }

    #[test]
    fn test_rejects_gaps_and_duplicates() {
        let mut gap = pages();
        gap.pop();
        gap.push(Page::new(6, SectionType::Story, "x"));
        assert!(matches!(
            CorpusStore::without_index(gap),
            Err(Error::Load(_))
        ));

        let mut dup = pages();
        dup.push(Page::new(4, SectionType::Story, "x"));
        assert!(CorpusStore::without_index(dup).is_err());

        assert!(CorpusStore::without_index(Vec::new()).is_err());
    }

    #[test]
    fn test_missing_index_is_unavailable() {
        let store = CorpusStore::without_index(pages()).unwrap();
        assert!(matches!(store.index(), Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_section_listing() {
        let store = CorpusStore::without_index(pages()).unwrap();
        let listing = store.sections();
        let tags: Vec<_> = listing.sections.iter().map(|s| s.section_type).collect();
        assert_eq!(
            tags,
            vec![
                SectionType::General,
                SectionType::Character,
                SectionType::Equipment
            ]
        );
        assert_eq!(listing.sections[1].count, 2);
        assert_eq!(listing.sections[1].first_page, 2);
        assert_eq!(listing.sections[1].last_page, 3);

        let text = listing.to_string();
        assert!(text.starts_with("=== MANUAL SECTIONS ===\n"));
        assert!(text.contains("**character**: 2 pages (pp. 2-3)"));
        assert!(text.ends_with("**Total: 4 pages**"));
    }

    #[test]
    fn test_section_names() {
        assert_eq!(
            SectionType::from_section_name("story_sections"),
            Some(SectionType::Story)
        );
        assert_eq!(SectionType::from_section_name("weapons"), None);
        assert_eq!(SectionType::from_section_name("story"), None);
        assert_eq!(
            SectionType::valid_section_names(),
            "characters, equipment, locations, story_sections, general_content"
        );
    }

    #[test]
    fn test_page_display() {
        let page = Page::new(7, SectionType::Location, "Shepherd's Rise");
        assert_eq!(
            page.to_string(),
            "=== Page 7 [location] ===\n\nShepherd's Rise"
        );
    }
}
