//! The `ManualSearch` facade front ends talk to.

use crate::assistant::{ManualTools, Orchestrator, ReasoningService, SearchAnswer, ToolDispatcher};
use crate::config::{Profile, SearchConfig};
use crate::error::Result;
use crate::jobs::{JobId, JobReport, JobTracker};
use crate::loader::ReferenceData;
use crate::relationships::RelationshipGraph;
use crate::retrieval::RetrievalEngine;
use claude::{Claude, Tool};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Owns the loaded stores, the reasoning loop and the job table.
pub struct ManualSearch {
    dispatcher: Arc<ToolDispatcher>,
    orchestrator: Arc<Orchestrator>,
    jobs: JobTracker,
    config: SearchConfig,
}

impl ManualSearch {
    /// Index `data` and wire it to `service`.
    pub fn new(
        data: ReferenceData,
        service: Arc<dyn ReasoningService>,
        config: SearchConfig,
    ) -> Result<Self> {
        let (retrieval, graph) = data.into_stores(config.fts_pool_size)?;
        let dispatcher = Arc::new(ToolDispatcher::new(Arc::new(retrieval), Arc::new(graph)));

        let mut orchestrator = Orchestrator::new(service, Arc::clone(&dispatcher));
        if let Some(prompt) = &config.system_prompt {
            orchestrator = orchestrator.with_system_prompt(prompt);
        }
        let orchestrator = Arc::new(orchestrator);

        let jobs = JobTracker::new(Arc::clone(&orchestrator), config.background.clone());

        Ok(Self {
            dispatcher,
            orchestrator,
            jobs,
            config,
        })
    }

    /// Load reference data from `path` (a `.json` document or a SQLite
    /// database) and talk to Claude with the key in `ANTHROPIC_API_KEY`.
    pub fn from_env(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = SearchConfig::from_env()?;
        let client = Claude::from_env()?;

        let data = if path.extension().is_some_and(|ext| ext == "json") {
            ReferenceData::from_json_file(path)?
        } else {
            ReferenceData::from_sqlite(path)?
        };
        info!(path = %path.display(), "manual search ready");

        Self::new(data, Arc::new(client), config)
    }

    /// Answer a question synchronously with the given profile.
    pub async fn ask(&self, query: &str, profile: Profile) -> Result<SearchAnswer> {
        self.orchestrator
            .run(query, self.config.profile(profile))
            .await
    }

    /// Start a background search and return its id.
    pub fn submit(&self, query: impl Into<String>) -> Result<JobId> {
        self.jobs.submit(query)
    }

    /// Poll a background search. Terminal results are handed out once.
    pub fn status(&self, job_id: &str) -> Result<JobReport> {
        self.jobs.status(job_id)
    }

    /// Run one tool directly, without the reasoning service.
    pub fn call_tool(&self, name: &str, input: &Value) -> Result<String> {
        self.dispatcher.dispatch(name, input)
    }

    /// The tool definitions offered to the model.
    pub fn tools(&self) -> Vec<Tool> {
        ManualTools::all()
    }

    pub fn retrieval(&self) -> &RetrievalEngine {
        self.dispatcher.retrieval()
    }

    pub fn graph(&self) -> &RelationshipGraph {
        self.dispatcher.graph()
    }

    pub fn jobs(&self) -> &JobTracker {
        &self.jobs
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
