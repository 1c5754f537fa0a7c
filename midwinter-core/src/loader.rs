//! Loading the manual, entity tables and relationships at startup.

use crate::corpus::{CorpusStore, Page, SectionType};
use crate::entities::{Building, Character, EntityIndex, GenericEntity, Skill, Vehicle};
use crate::error::{Error, Result};
use crate::relationships::{curated_relationships, Relationship, RelationshipGraph, Sentiment};
use crate::retrieval::RetrievalEngine;
use rusqlite::{Connection, OpenFlags, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Everything the search core needs, before indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub pages: Vec<Page>,
    #[serde(flatten)]
    pub entities: EntityIndex,
    /// `None` means "use the curated table shipped with the crate".
    #[serde(default)]
    pub relationships: Option<Vec<Relationship>>,
}

impl ReferenceData {
    /// Read a reference database.
    ///
    /// `manual_pages`, `characters`, `buildings` and `enemy_vehicles` are
    /// required. `skills`, `entities` and `character_relationships` are read
    /// when present.
    pub fn from_sqlite(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::Load(format!("{}: {e}", path.display())))?;

        let pages = query_all(
            &conn,
            "SELECT page_number, section_type, content FROM manual_pages ORDER BY page_number",
            |row| {
                let tag: String = row.get(1)?;
                Ok((row.get::<_, u32>(0)?, tag, row.get::<_, String>(2)?))
            },
        )?
        .into_iter()
        .map(|(n, tag, content)| {
            let section = SectionType::parse(&tag)
                .ok_or_else(|| Error::Load(format!("page {n} has unknown section '{tag}'")))?;
            Ok(Page::new(n, section, content))
        })
        .collect::<Result<Vec<_>>>()?;

        let characters = query_all(
            &conn,
            "SELECT full_name, title, CAST(age AS TEXT), occupation, biography, search_text
             FROM characters ORDER BY rowid",
            |row| {
                Ok(Character {
                    full_name: row.get(0)?,
                    title: row.get(1)?,
                    age: row.get(2)?,
                    occupation: row.get(3)?,
                    biography: row.get(4)?,
                    search_text: row.get(5)?,
                })
            },
        )?;

        let buildings = query_all(
            &conn,
            "SELECT building_type, description, gameplay_function FROM buildings ORDER BY rowid",
            |row| {
                Ok(Building {
                    building_type: row.get(0)?,
                    description: row.get(1)?,
                    gameplay_function: row.get(2)?,
                })
            },
        )?;

        let enemy_vehicles = query_all(
            &conn,
            "SELECT vehicle_type, role, description FROM enemy_vehicles ORDER BY rowid",
            |row| {
                Ok(Vehicle {
                    vehicle_type: row.get(0)?,
                    role: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )?;

        let skills = if table_exists(&conn, "skills")? {
            query_all(
                &conn,
                "SELECT skill_name, description FROM skills ORDER BY rowid",
                |row| {
                    Ok(Skill {
                        skill_name: row.get(0)?,
                        description: row.get(1)?,
                    })
                },
            )?
        } else {
            Vec::new()
        };

        let entities = if table_exists(&conn, "entities")? {
            query_all(
                &conn,
                "SELECT name, entity_type, description FROM entities ORDER BY rowid",
                |row| {
                    Ok(GenericEntity {
                        name: row.get(0)?,
                        entity_type: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )?
        } else {
            Vec::new()
        };

        let relationships = if table_exists(&conn, "character_relationships")? {
            let rows = query_all(
                &conn,
                "SELECT from_character, to_character, relationship_type, sentiment
                 FROM character_relationships ORDER BY rowid",
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )?;
            let edges = rows
                .into_iter()
                .map(|(from, to, kind, sentiment)| {
                    let sentiment = Sentiment::parse(&sentiment).ok_or_else(|| {
                        Error::Load(format!(
                            "relationship {from} -> {to} has unknown sentiment '{sentiment}'"
                        ))
                    })?;
                    Ok(Relationship::new(from, to, kind, sentiment))
                })
                .collect::<Result<Vec<_>>>()?;
            Some(edges)
        } else {
            None
        };

        info!(
            path = %path.display(),
            pages = pages.len(),
            characters = characters.len(),
            relationships = relationships.as_ref().map(Vec::len),
            "reference database read"
        );

        Ok(Self {
            pages,
            entities: EntityIndex {
                characters,
                buildings,
                enemy_vehicles,
                skills,
                entities,
            },
            relationships,
        })
    }

    /// Parse the JSON form: `pages`, the entity tables by name, and an
    /// optional `relationships` array.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Load(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// The relationship edges to load, falling back to the curated table.
    pub fn relationship_edges(&self) -> Vec<Relationship> {
        match &self.relationships {
            Some(edges) => edges.clone(),
            None => curated_relationships(),
        }
    }

    /// Validate and index the data, producing the shared read-only stores.
    pub fn into_stores(self, fts_pool_size: usize) -> Result<(RetrievalEngine, RelationshipGraph)> {
        if self.relationships.is_none() {
            info!("no relationship table supplied; using curated relationships");
        }
        let edges = self.relationship_edges();
        let graph = RelationshipGraph::new(edges, self.entities.character_names());
        let corpus = CorpusStore::new(self.pages, fts_pool_size)?;
        let retrieval = RetrievalEngine::new(Arc::new(corpus), Arc::new(self.entities));
        Ok((retrieval, graph))
    }
}

fn query_all<T>(
    conn: &Connection,
    sql: &str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
