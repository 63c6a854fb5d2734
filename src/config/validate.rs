// src/config/validate.rs

//! Structural checks on a loaded config.
//!
//! Dependency references and cycles are *not* checked here: the
//! orchestrator does that when it starts, so file-driven and programmatic
//! runs fail with the same error kinds.

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BootdagError, Result};
use crate::job::ROOT_JOB_KEY;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BootdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.default, raw.job))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_global_config(cfg)?;
    validate_jobs(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(BootdagError::ConfigError(
            "config must contain at least one [job.<key>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.matrix_chunk_max == 0 {
        return Err(BootdagError::ConfigError(
            "[config].matrix_chunk_max must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.config.name.trim().is_empty() {
        return Err(BootdagError::ConfigError(
            "[config].name must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_jobs(cfg: &RawConfigFile) -> Result<()> {
    for (key, job) in cfg.job.iter() {
        if key == ROOT_JOB_KEY {
            return Err(BootdagError::ConfigError(format!(
                "job key '{key}' is reserved"
            )));
        }
        if job.cmd.trim().is_empty() {
            return Err(BootdagError::ConfigError(format!(
                "job '{key}' has an empty `cmd`"
            )));
        }
    }
    Ok(())
}
