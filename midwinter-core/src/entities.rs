//! Structured entity tables extracted from the manual.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Matches returned per entity kind.
pub const MAX_MATCHES_PER_KIND: usize = 10;

/// Biographies longer than this are cut in quick-search output.
pub const BIO_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Character {
    pub full_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    /// Free text searched alongside the name; falls back to the biography.
    #[serde(default)]
    pub search_text: Option<String>,
}

impl Character {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn with_biography(mut self, biography: impl Into<String>) -> Self {
        self.biography = Some(biography.into());
        self
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.full_name, needle)
            || self
                .search_text
                .as_deref()
                .or(self.biography.as_deref())
                .is_some_and(|t| contains_ci(t, needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub building_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gameplay_function: Option<String>,
}

impl Building {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.building_type, needle) || opt_contains(&self.description, needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_type: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Vehicle {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.vehicle_type, needle) || opt_contains(&self.description, needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Skill {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.skill_name, needle) || opt_contains(&self.description, needle)
    }
}

/// Anything else the extraction pass found (equipment, places, factions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericEntity {
    pub name: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl GenericEntity {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || opt_contains(&self.description, needle)
    }
}

/// All entity tables, immutable after load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityIndex {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub enemy_vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub entities: Vec<GenericEntity>,
}

impl EntityIndex {
    /// Case-insensitive substring match over every kind, capped per kind.
    pub fn quick_search(&self, query: &str) -> EntityMatches<'_> {
        let needle = query.to_lowercase();
        EntityMatches {
            query: query.to_string(),
            characters: take_matching(&self.characters, |c| c.matches(&needle)),
            buildings: take_matching(&self.buildings, |b| b.matches(&needle)),
            vehicles: take_matching(&self.enemy_vehicles, |v| v.matches(&needle)),
            skills: take_matching(&self.skills, |s| s.matches(&needle)),
            entities: take_matching(&self.entities, |e| e.matches(&needle)),
        }
    }

    /// Sorted name listing for every kind.
    pub fn listing(&self) -> EntityListing {
        fn sorted<T>(items: &[T], key: impl Fn(&T) -> &str) -> Vec<String> {
            let mut names: Vec<String> = items.iter().map(|i| key(i).to_string()).collect();
            names.sort();
            names
        }

        EntityListing {
            characters: sorted(&self.characters, |c| c.full_name.as_str()),
            buildings: sorted(&self.buildings, |b| b.building_type.as_str()),
            vehicles: sorted(&self.enemy_vehicles, |v| v.vehicle_type.as_str()),
            skills: sorted(&self.skills, |s| s.skill_name.as_str()),
            entities: sorted(&self.entities, |e| e.name.as_str()),
        }
    }

    /// Every character name, in load order.
    pub fn character_names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.full_name.as_str())
    }
}

/// Result of [`EntityIndex::quick_search`].
#[derive(Debug, Clone)]
pub struct EntityMatches<'a> {
    pub query: String,
    pub characters: Vec<&'a Character>,
    pub buildings: Vec<&'a Building>,
    pub vehicles: Vec<&'a Vehicle>,
    pub skills: Vec<&'a Skill>,
    pub entities: Vec<&'a GenericEntity>,
}

impl EntityMatches<'_> {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.buildings.is_empty()
            && self.vehicles.is_empty()
            && self.skills.is_empty()
            && self.entities.is_empty()
    }

    fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        let header = |out: &mut Vec<String>, title: &str| {
            if out.is_empty() {
                out.push(format!("=== {title} ==="));
            } else {
                out.push(format!("\n=== {title} ==="));
            }
        };

        if !self.characters.is_empty() {
            header(&mut out, "CHARACTERS");
            for c in &self.characters {
                out.push(format!("\n**{}**", c.full_name));
                push_field(&mut out, "  Title: ", &c.title);
                push_field(&mut out, "  Age: ", &c.age);
                push_field(&mut out, "  Occupation: ", &c.occupation);
                if let Some(bio) = c.biography.as_deref().filter(|b| !b.is_empty()) {
                    out.push(format!("  Bio: {}", preview(bio, BIO_PREVIEW_CHARS)));
                }
            }
        }

        if !self.buildings.is_empty() {
            header(&mut out, "BUILDINGS");
            for b in &self.buildings {
                out.push(format!("\n**{}**", b.building_type));
                push_field(&mut out, "  ", &b.description);
                push_field(&mut out, "  Function: ", &b.gameplay_function);
            }
        }

        if !self.vehicles.is_empty() {
            header(&mut out, "ENEMY VEHICLES");
            for v in &self.vehicles {
                out.push(format!("\n**{}**", v.vehicle_type));
                push_field(&mut out, "  Role: ", &v.role);
                push_field(&mut out, "  ", &v.description);
            }
        }

        if !self.skills.is_empty() {
            header(&mut out, "SKILLS");
            for s in &self.skills {
                out.push(format!("\n**{}**", s.skill_name));
                push_field(&mut out, "  ", &s.description);
            }
        }

        if !self.entities.is_empty() {
            header(&mut out, "ENTITIES");
            for e in &self.entities {
                out.push(format!("\n**{}**", e.name));
                push_field(&mut out, "  Type: ", &e.entity_type);
                push_field(&mut out, "  ", &e.description);
            }
        }

        out
    }
}

impl fmt::Display for EntityMatches<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No entities found matching '{}'", self.query);
        }
        f.write_str(&self.lines().join("\n"))
    }
}

/// Result of [`EntityIndex::listing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityListing {
    pub characters: Vec<String>,
    pub buildings: Vec<String>,
    pub vehicles: Vec<String>,
    pub skills: Vec<String>,
    pub entities: Vec<String>,
}

impl fmt::Display for EntityListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block = |title: &str, names: &[String]| {
            format!("=== {title} ({}) ===\n{}", names.len(), names.join(", "))
        };

        let mut blocks = vec![
            block("CHARACTERS", &self.characters),
            block("BUILDINGS", &self.buildings),
            block("ENEMY VEHICLES", &self.vehicles),
        ];
        if !self.skills.is_empty() {
            blocks.push(block("SKILLS", &self.skills));
        }
        if !self.entities.is_empty() {
            blocks.push(block("ENTITIES", &self.entities));
        }
        f.write_str(&blocks.join("\n\n"))
    }
}

fn take_matching<T>(items: &[T], pred: impl Fn(&T) -> bool) -> Vec<&T> {
    items
        .iter()
        .filter(|i| pred(i))
        .take(MAX_MATCHES_PER_KIND)
        .collect()
}

fn push_field(out: &mut Vec<String>, prefix: &str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        out.push(format!("{prefix}{v}"));
    }
}

/// `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn opt_contains(haystack: &Option<String>, needle: &str) -> bool {
    haystack.as_deref().is_some_and(|h| contains_ci(h, needle))
}

/// First `max` characters of `text`, with `...` appended when cut.
pub(crate) fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
