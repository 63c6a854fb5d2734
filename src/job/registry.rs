// src/job/registry.rs

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::job::{Job, JobKey};

/// Jobs registered with one orchestrator, kept in registration order.
///
/// Re-registering a key replaces the job but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: HashMap<JobKey, Job>,
    order: Vec<JobKey>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `job` under its key. Returns the replaced job, if
    /// any.
    ///
    /// Repeated dependency keys are collapsed here, so every dependency
    /// relationship contributes exactly one unit of in-degree.
    pub fn register(&mut self, mut job: Job) -> Option<Job> {
        job.dedup_deps();
        let key = job.key().to_string();

        let replaced = self.jobs.insert(key.clone(), job);
        if replaced.is_some() {
            debug!(job = %key, "job re-registered; replacing previous definition");
        } else {
            self.order.push(key);
        }
        replaced
    }

    pub fn get(&self, key: &str) -> Option<&Job> {
        self.jobs.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.jobs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered jobs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().filter_map(|k| self.jobs.get(k))
    }

    /// Declared dependency keys that no registered job provides, sorted.
    pub fn missing_dependencies(&self) -> Vec<JobKey> {
        let declared: BTreeSet<&str> = self
            .jobs
            .values()
            .flat_map(|job| job.deps().iter().map(String::as_str))
            .collect();

        declared
            .into_iter()
            .filter(|dep| !self.jobs.contains_key(*dep))
            .map(str::to_string)
            .collect()
    }
}
