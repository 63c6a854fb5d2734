// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::job::{Job, Work};
use crate::orchestrator::{DEFAULT_MATRIX_CHUNK_MAX, DEFAULT_NAME, OrchestratorOptions};
use crate::types::ExecutionContext;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// name = "app-startup"
/// diagnostics = true
///
/// [default]
/// context = "spawn"
///
/// [job.db]
/// cmd = "./migrate.sh"
/// context = "blocking"
///
/// [job.cache]
/// cmd = "./warm-cache.sh"
/// after = ["db"]
/// ```
///
/// All sections are optional and have reasonable defaults; validation
/// (see `config::validate`) requires at least one job.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Orchestrator settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Job defaults from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All jobs from `[job.<key>]`, keyed by job key.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// A validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub default: DefaultSection,
    pub job: BTreeMap<String, JobConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        default: DefaultSection,
        job: BTreeMap<String, JobConfig>,
    ) -> Self {
        Self {
            config,
            default,
            job,
        }
    }

    /// Orchestrator options described by `[config]`.
    pub fn options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            name: self.config.name.clone(),
            diagnostics: self.config.diagnostics,
            matrix_chunk_max: self.config.matrix_chunk_max,
        }
    }

    /// One command job per `[job.<key>]` section.
    pub fn jobs(&self) -> Vec<Job> {
        self.job
            .iter()
            .map(|(key, jc)| {
                Job::new(key.clone(), Work::command(jc.cmd.clone()))
                    .depends_on(jc.after.iter().cloned())
                    .in_context(jc.effective_context(self.default.context))
            })
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Orchestrator name, handed to callbacks and used in logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Log the adjacency matrix, every root-to-leaf path and the level order
    /// when the run starts.
    #[serde(default)]
    pub diagnostics: bool,

    /// Matrix columns per block in diagnostic output. Must be >= 1.
    #[serde(default = "default_matrix_chunk_max")]
    pub matrix_chunk_max: usize,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_matrix_chunk_max() -> usize {
    DEFAULT_MATRIX_CHUNK_MAX
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            diagnostics: false,
            matrix_chunk_max: default_matrix_chunk_max(),
        }
    }
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Execution context for jobs that do not set their own.
    #[serde(default)]
    pub context: ExecutionContext,
}

/// `[job.<key>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Shell command forming the job body.
    pub cmd: String,

    /// Keys of the jobs this one waits for. Empty means it only waits for
    /// the root.
    #[serde(default)]
    pub after: Vec<String>,

    /// Per-job execution context; falls back to `default.context`.
    #[serde(default)]
    pub context: Option<ExecutionContext>,
}

impl JobConfig {
    pub fn effective_context(&self, default: ExecutionContext) -> ExecutionContext {
        self.context.unwrap_or(default)
    }
}
