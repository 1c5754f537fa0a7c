//! Background search jobs.
//!
//! A job runs one search on its own task. Its terminal record can be read
//! exactly once; the read that returns it also deletes it.

use crate::assistant::{Orchestrator, SearchAnswer};
use crate::config::ProfileConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Opaque job handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

/// What a status read returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub id: JobId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub result: Option<SearchAnswer>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct JobRecord {
    status: JobStatus,
    created_at: DateTime<Utc>,
    outcome: Option<std::result::Result<SearchAnswer, String>>,
}

impl JobRecord {
    fn status_only(&self, id: JobId) -> JobReport {
        JobReport {
            id,
            status: self.status,
            created_at: self.created_at,
            result: None,
            error: None,
        }
    }

    fn into_report(self, id: JobId) -> JobReport {
        let (result, error) = match self.outcome {
            Some(Ok(answer)) => (Some(answer), None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };
        JobReport {
            id,
            status: self.status,
            created_at: self.created_at,
            result,
            error,
        }
    }
}

/// The job map. Only these four operations touch it.
#[derive(Default)]
struct JobTable {
    jobs: DashMap<JobId, JobRecord>,
}

impl JobTable {
    fn insert(&self, id: JobId) {
        self.jobs.insert(
            id,
            JobRecord {
                status: JobStatus::Pending,
                created_at: Utc::now(),
                outcome: None,
            },
        );
    }

    fn mark_running(&self, id: JobId) {
        if let Some(mut record) = self.jobs.get_mut(&id) {
            if record.status == JobStatus::Pending {
                record.status = JobStatus::Running;
            }
        }
    }

    fn finish(&self, id: JobId, outcome: std::result::Result<SearchAnswer, String>) {
        if let Some(mut record) = self.jobs.get_mut(&id) {
            if !record.status.is_terminal() {
                record.status = if outcome.is_ok() {
                    JobStatus::Complete
                } else {
                    JobStatus::Error
                };
                record.outcome = Some(outcome);
            }
        }
    }

    fn consume_if_terminal(&self, id: JobId) -> Option<JobReport> {
        loop {
            if let Some((_, record)) = self.jobs.remove_if(&id, |_, r| r.status.is_terminal()) {
                return Some(record.into_report(id));
            }
            // Drop the `get` guard before retrying `remove_if`.
            let snapshot = self.jobs.get(&id).map(|r| r.status_only(id));
            match snapshot {
                None => return None,
                // Finished between the two lookups; take it on the next pass.
                Some(report) if report.status.is_terminal() => continue,
                Some(report) => return Some(report),
            }
        }
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}

/// Submits searches as background jobs and hands back their results once.
pub struct JobTracker {
    table: Arc<JobTable>,
    orchestrator: Arc<Orchestrator>,
    profile: ProfileConfig,
}

impl JobTracker {
    /// Jobs run with `profile`, normally the background profile.
    pub fn new(orchestrator: Arc<Orchestrator>, profile: ProfileConfig) -> Self {
        Self {
            table: Arc::new(JobTable::default()),
            orchestrator,
            profile,
        }
    }

    /// Record a pending job and start it. Returns without waiting.
    ///
    /// With no tokio runtime on the current thread the job is recorded as
    /// failed instead.
    pub fn submit(&self, query: impl Into<String>) -> Result<JobId> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let id = JobId::new();
        self.table.insert(id);
        info!(job = %id, "job submitted");

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(job = %id, error = %e, "no runtime to run job");
                self.table
                    .finish(id, Err(format!("No async runtime available: {e}")));
                return Ok(id);
            }
        };

        let table = Arc::clone(&self.table);
        let orchestrator = Arc::clone(&self.orchestrator);
        let profile = self.profile.clone();
        handle.spawn(async move {
            table.mark_running(id);
            debug!(job = %id, "job running");
            let outcome = orchestrator
                .run(&query, &profile)
                .await
                .map_err(|e| e.to_string());
            match &outcome {
                Ok(answer) => info!(job = %id, rounds = answer.rounds, "job complete"),
                Err(e) => warn!(job = %id, error = %e, "job failed"),
            }
            table.finish(id, outcome);
        });

        Ok(id)
    }

    /// Current state of a job. A terminal job is returned once and then
    /// forgotten.
    pub fn status(&self, id: &str) -> Result<JobReport> {
        let job_id: JobId = id
            .trim()
            .parse()
            .map_err(|_| Error::JobNotFound(id.to_string()))?;
        let report = self
            .table
            .consume_if_terminal(job_id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        if report.status.is_terminal() {
            debug!(job = %job_id, status = ?report.status, "job consumed");
        }
        Ok(report)
    }

    /// Jobs currently tracked, including unread terminal ones.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> SearchAnswer {
        SearchAnswer {
            query: "q".into(),
            results: Vec::new(),
            raw_response: Some("a".into()),
            rounds: 0,
            exchanges: 1,
            forced_finalization: false,
        }
    }

    #[test]
    fn test_job_id_round_trips_through_text() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-job".parse::<JobId>().is_err());
    }

    #[test]
    fn test_status_is_monotonic() {
        let table = JobTable::default();
        let id = JobId::new();
        table.insert(id);
        table.mark_running(id);
        table.finish(id, Ok(answer()));
        // Late transitions are ignored.
        table.mark_running(id);
        table.finish(id, Err("late".into()));

        let report = table.consume_if_terminal(id).unwrap();
        assert_eq!(report.status, JobStatus::Complete);
        assert!(report.result.is_some());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_terminal_read_consumes() {
        let table = JobTable::default();
        let id = JobId::new();
        table.insert(id);

        let pending = table.consume_if_terminal(id).unwrap();
        assert_eq!(pending.status, JobStatus::Pending);
        assert_eq!(table.len(), 1);

        table.finish(id, Err("boom".into()));
        let done = table.consume_if_terminal(id).unwrap();
        assert_eq!(done.status, JobStatus::Error);
        assert_eq!(done.error.as_deref(), Some("boom"));
        assert!(table.consume_if_terminal(id).is_none());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_unknown_job() {
        let table = JobTable::default();
        assert!(table.consume_if_terminal(JobId::new()).is_none());
    }
}
