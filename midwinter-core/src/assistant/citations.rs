//! Page citations in the final answer.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest excerpt kept per citation.
pub const MAX_EXCERPT_CHARS: usize = 500;

lazy_static! {
    static ref CITATION: Regex =
        Regex::new(r"(?i)\*{0,2}Page (\d+)\*{0,2}\s*\[([^\]]+)\]").expect("citation pattern");
}

/// One `**Page N** [section]` reference and the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub page_number: u32,
    pub section: String,
    pub excerpt: String,
}

/// Split an answer at each citation marker. The excerpt runs from the end of
/// one marker to the start of the next, trimmed and capped.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let matches: Vec<_> = CITATION.captures_iter(text).collect();
    let mut citations = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(page), Some(section)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let Ok(page_number) = page.as_str().parse::<u32>() else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());

        citations.push(Citation {
            page_number,
            section: section.as_str().trim().to_string(),
            excerpt: text[whole.end()..end]
                .trim()
                .chars()
                .take(MAX_EXCERPT_CHARS)
                .collect(),
        });
    }
    citations
}
