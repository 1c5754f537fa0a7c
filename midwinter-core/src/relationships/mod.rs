//! Directed, sentiment-labelled relationships between characters and the
//! recruitment rules built on them.
//!
//! Edges are kept exactly as authored. A dislikes B says nothing about how
//! B feels about A.

mod curated;

pub use curated::curated_relationships;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::debug;

/// Whether an edge helps or blocks recruitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

/// One directed edge: how `from_character` regards `to_character`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_character: String,
    pub to_character: String,
    pub relationship_type: String,
    pub sentiment: Sentiment,
}

impl Relationship {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relationship_type: impl Into<String>,
        sentiment: Sentiment,
    ) -> Self {
        Self {
            from_character: from.into(),
            to_character: to.into(),
            relationship_type: relationship_type.into(),
            sentiment,
        }
    }
}

/// The other end of an edge, seen from one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub name: String,
    pub relationship_type: String,
}

/// Outcome of a recruitment check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reasons", rename_all = "lowercase")]
pub enum RecruitDecision {
    /// The target holds these negative labels towards the recruiter.
    No(Vec<String>),
    /// The recruiter holds these positive labels towards the target.
    Yes(Vec<String>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruitVerdict {
    pub recruiter: String,
    pub target: String,
    pub decision: RecruitDecision,
}

impl fmt::Display for RecruitVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Can {} recruit {}? ===", self.recruiter, self.target)?;
        match &self.decision {
            RecruitDecision::No(labels) => write!(
                f,
                "\nNO - {} {} {}",
                self.target,
                labels.join(", "),
                self.recruiter
            ),
            RecruitDecision::Yes(labels) => write!(
                f,
                "\nYES - {} is {} with {}",
                self.recruiter,
                labels.join(", "),
                self.target
            ),
            RecruitDecision::Unknown => write!(
                f,
                "\nUNKNOWN - No direct relationship found\n(They are not friends, but also not enemies)"
            ),
        }
    }
}

/// Who the target would and would not follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruiterReport {
    pub target: String,
    pub can_recruit: Vec<Link>,
    pub cannot_recruit: Vec<Link>,
}

impl fmt::Display for RecruiterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Who can recruit {}? ===", self.target)?;
        if self.can_recruit.is_empty() {
            write!(f, "\nCAN RECRUIT: No specific friends listed")?;
        } else {
            write!(f, "\nCAN RECRUIT:")?;
            write_links(f, &self.can_recruit)?;
        }
        if self.cannot_recruit.is_empty() {
            write!(f, "\n\nCANNOT RECRUIT: No enemies listed")
        } else {
            write!(f, "\n\nCANNOT RECRUIT:")?;
            write_links(f, &self.cannot_recruit)
        }
    }
}

/// Edges of one sentiment touching a character, split by direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialCircle {
    pub character: String,
    pub sentiment: Sentiment,
    /// Edges the character authored.
    pub outgoing: Vec<Link>,
    /// Edges pointing at the character.
    pub incoming: Vec<Link>,
}

impl fmt::Display for SocialCircle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (title, verb, passive, none) = match self.sentiment {
            Sentiment::Positive => ("Friends", "LIKES", "LIKED BY", "No friends found!"),
            Sentiment::Negative => ("Enemies", "DISLIKES", "DISLIKED BY", "No enemies found!"),
        };

        writeln!(f, "=== {} of {} ===", title, self.character)?;
        if !self.outgoing.is_empty() {
            write!(f, "\n{} {}:", self.character, verb)?;
            write_links(f, &self.outgoing)?;
        }
        if !self.incoming.is_empty() {
            write!(f, "\n\n{passive}:")?;
            write_links(f, &self.incoming)?;
        }
        if self.outgoing.is_empty() && self.incoming.is_empty() {
            write!(f, "\n{none}")?;
        }
        Ok(())
    }
}

fn write_links(f: &mut fmt::Formatter<'_>, links: &[Link]) -> fmt::Result {
    for link in links {
        write!(f, "\n  - {} ({})", link.name, link.relationship_type)?;
    }
    Ok(())
}

/// Immutable relationship graph plus the set of names it can resolve.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    edges: Vec<Relationship>,
    names: BTreeSet<String>,
}

impl RelationshipGraph {
    /// Build from edges in load order; duplicate `(from, to, type)` triples
    /// after the first are dropped. `known_names` adds characters with no
    /// edges so they still resolve.
    pub fn new<'a>(
        edges: impl IntoIterator<Item = Relationship>,
        known_names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut dropped = 0usize;
        for edge in edges {
            let key = (
                edge.from_character.clone(),
                edge.to_character.clone(),
                edge.relationship_type.clone(),
            );
            if seen.insert(key) {
                kept.push(edge);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, "ignored duplicate relationship edges");
        }

        let mut names: BTreeSet<String> = known_names.into_iter().map(str::to_string).collect();
        for edge in &kept {
            names.insert(edge.from_character.clone());
            names.insert(edge.to_character.clone());
        }

        Self { edges: kept, names }
    }

    pub fn edges(&self) -> &[Relationship] {
        &self.edges
    }

    /// Every resolvable name, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Map free text to one canonical character name.
    ///
    /// An exact case-insensitive match wins; otherwise the lexicographically
    /// smallest name containing the text.
    pub fn resolve(&self, text: &str) -> Result<&str> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::CharacterNotFound(text.to_string()));
        }

        self.names
            .iter()
            .find(|n| n.to_lowercase() == needle)
            .or_else(|| self.names.iter().find(|n| n.to_lowercase().contains(&needle)))
            .map(String::as_str)
            .ok_or_else(|| Error::CharacterNotFound(text.to_string()))
    }

    /// A negative edge from target to recruiter blocks; otherwise a positive
    /// edge from recruiter to target permits.
    pub fn can_recruit(&self, recruiter: &str, target: &str) -> Result<RecruitVerdict> {
        let recruiter = self.resolve(recruiter)?;
        let target = self.resolve(target)?;

        let blocked = self.labels(target, recruiter, Sentiment::Negative);
        let decision = if !blocked.is_empty() {
            RecruitDecision::No(blocked)
        } else {
            let permitted = self.labels(recruiter, target, Sentiment::Positive);
            if permitted.is_empty() {
                RecruitDecision::Unknown
            } else {
                RecruitDecision::Yes(permitted)
            }
        };

        Ok(RecruitVerdict {
            recruiter: recruiter.to_string(),
            target: target.to_string(),
            decision,
        })
    }

    /// The target's own outgoing edges, split by sentiment.
    pub fn who_can_recruit(&self, target: &str) -> Result<RecruiterReport> {
        let target = self.resolve(target)?;
        Ok(RecruiterReport {
            target: target.to_string(),
            can_recruit: self.outgoing(target, Sentiment::Positive),
            cannot_recruit: self.outgoing(target, Sentiment::Negative),
        })
    }

    pub fn friends(&self, character: &str) -> Result<SocialCircle> {
        self.circle(character, Sentiment::Positive)
    }

    pub fn enemies(&self, character: &str) -> Result<SocialCircle> {
        self.circle(character, Sentiment::Negative)
    }

    fn circle(&self, character: &str, sentiment: Sentiment) -> Result<SocialCircle> {
        let name = self.resolve(character)?;
        let incoming = self
            .edges
            .iter()
            .filter(|e| e.to_character == name && e.sentiment == sentiment)
            .map(|e| Link {
                name: e.from_character.clone(),
                relationship_type: e.relationship_type.clone(),
            })
            .collect();

        Ok(SocialCircle {
            character: name.to_string(),
            sentiment,
            outgoing: self.outgoing(name, sentiment),
            incoming,
        })
    }

    fn outgoing(&self, from: &str, sentiment: Sentiment) -> Vec<Link> {
        self.edges
            .iter()
            .filter(|e| e.from_character == from && e.sentiment == sentiment)
            .map(|e| Link {
                name: e.to_character.clone(),
                relationship_type: e.relationship_type.clone(),
            })
            .collect()
    }

    fn labels(&self, from: &str, to: &str, sentiment: Sentiment) -> Vec<String> {
        self.edges
            .iter()
            .filter(|e| e.from_character == from && e.to_character == to && e.sentiment == sentiment)
            .map(|e| e.relationship_type.clone())
            .collect()
    }
}
