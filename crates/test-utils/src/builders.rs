#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use bootdag::config::{ConfigFile, ConfigSection, DefaultSection, JobConfig, RawConfigFile};
use bootdag::{ExecutionContext, Job, JobError, Work};

/// Shared log of job keys, appended to by [`recording_job`] bodies.
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Job with the given dependencies whose body does nothing.
pub fn noop_job(key: &str, deps: &[&str]) -> Job {
    Job::new(key, Work::noop()).depends_on(deps.iter().copied())
}

/// Job whose body appends its key to `log` and succeeds.
pub fn recording_job(key: &str, deps: &[&str], log: &RunLog) -> Job {
    let log = Arc::clone(log);
    let name = key.to_string();
    Job::new(
        key,
        Work::blocking(move || {
            log.lock().unwrap().push(name.clone());
            Ok(())
        }),
    )
    .depends_on(deps.iter().copied())
}

/// Job whose body fails with `msg`.
pub fn failing_job(key: &str, deps: &[&str], msg: &str) -> Job {
    let msg = msg.to_string();
    Job::new(key, Work::blocking(move || Err(JobError::msg(msg.clone()))))
        .depends_on(deps.iter().copied())
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                default: DefaultSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, key: &str, job: JobConfig) -> Self {
        self.config.job.insert(key.to_string(), job);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.config.config.name = name.to_string();
        self
    }

    pub fn with_diagnostics(mut self, val: bool) -> Self {
        self.config.config.diagnostics = val;
        self
    }

    pub fn with_default_context(mut self, context: ExecutionContext) -> Self {
        self.config.default.context = context;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            job: JobConfig {
                cmd: cmd.to_string(),
                after: vec![],
                context: None,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.job.after.push(dep.to_string());
        self
    }

    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.job.context = Some(context);
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
