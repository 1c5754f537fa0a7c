//! Question answering over the Midwinter game manual.
//!
//! This crate provides:
//! - Ranked full-text search over the manual with a substring fallback
//! - Entity lookup for characters, buildings, vehicles and skills
//! - The character relationship graph and its recruitment rules
//! - A bounded tool-use loop that lets Claude research an answer
//! - Background jobs whose results can be collected once
//!
//! # Quick Start
//!
//! ```ignore
//! use midwinter_core::{ManualSearch, Profile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = ManualSearch::from_env("database/midwinter_unified.db")?;
//!
//!     let answer = search.ask("How do I use the hang glider?", Profile::Standard).await?;
//!     println!("{}", answer.text());
//!
//!     let job = search.submit("Who can recruit Davy Hart?")?;
//!     println!("submitted {job}");
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod config;
pub mod corpus;
pub mod entities;
pub mod error;
pub mod jobs;
pub mod loader;
pub mod relationships;
pub mod retrieval;
pub mod session;
pub mod testing;

// Primary public API
pub use assistant::{Citation, Orchestrator, ReasoningService, SearchAnswer, ToolDispatcher};
pub use config::{Profile, ProfileConfig, SearchConfig};
pub use error::{Error, ErrorKind, Result};
pub use jobs::{JobId, JobReport, JobStatus};
pub use loader::ReferenceData;
pub use session::ManualSearch;
pub use testing::{MockReasoner, MockReply};
