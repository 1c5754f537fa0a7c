//! In-memory FTS5 index over the manual pages.
//!
//! Every connection in the pool holds its own copy of the index, so reads on
//! different connections never contend. Connections are handed out
//! round-robin.

use super::{Page, SectionType};
use crate::error::{Error, Result};
use rusqlite::{params, Connection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Default number of indexed connections.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Maximum number of indexed connections.
const MAX_POOL_SIZE: usize = 8;

/// Tokens of context in each snippet window.
const SNIPPET_TOKENS: i64 = 32;

const SCHEMA: &str = "CREATE VIRTUAL TABLE manual_fts USING fts5(
    page_number UNINDEXED,
    section_type UNINDEXED,
    content
)";

/// A ranked match from the index.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub page_number: u32,
    pub snippet: String,
    /// BM25 score; lower is better.
    pub score: f64,
}

/// Pool of in-memory SQLite connections, each holding an identical index.
pub struct FtsIndex {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl FtsIndex {
    /// Build `pool_size` identical indexes over `pages` (clamped to 1..=8).
    pub fn build(pages: &[Page], pool_size: usize) -> Result<Self> {
        let size = pool_size.clamp(1, MAX_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(Mutex::new(open_indexed(pages)?));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Number of connections in the pool.
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Run a ranked query, optionally restricted to one section.
    ///
    /// Rows come back best-first with ties broken by ascending page number.
    /// Anything the index rejects (malformed query syntax, a poisoned
    /// connection) is reported as [`Error::Unavailable`].
    pub fn search(
        &self,
        query: &str,
        section: Option<SectionType>,
        limit: usize,
    ) -> Result<Vec<RankedRow>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT page_number,
                        snippet(manual_fts, 2, '>>>', '<<<', '...', ?3),
                        bm25(manual_fts) AS score
                 FROM manual_fts
                 WHERE manual_fts MATCH ?1
                   AND (?2 IS NULL OR section_type = ?2)
                 ORDER BY score, page_number
                 LIMIT ?4",
            )?;
            let rows = stmt.query_map(
                params![
                    query,
                    section.map(|s| s.as_str()),
                    SNIPPET_TOKENS,
                    limit as i64
                ],
                |row| {
                    Ok(RankedRow {
                        page_number: row.get(0)?,
                        snippet: row.get(1)?,
                        score: row.get(2)?,
                    })
                },
            )?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[idx]
            .lock()
            .map_err(|e| Error::Unavailable(format!("index connection poisoned: {e}")))?;
        f(&guard).map_err(|e| Error::Unavailable(e.to_string()))
    }
}

fn open_indexed(pages: &[Page]) -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    let tx = conn.transaction()?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO manual_fts (page_number, section_type, content) VALUES (?1, ?2, ?3)",
        )?;
        for page in pages {
            insert.execute(params![
                page.page_number,
                page.section_type.as_str(),
                page.content
            ])?;
        }
    }
    tx.commit()?;
    Ok(conn)
}
