// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Where a job body is executed.
///
/// The core never interprets this; it is carried on the job and handed to
/// the executor, which decides how to honour it.
///
/// - `Inline`: run on the coordinator itself, before any further job of the
///   same chunk is launched.
/// - `Spawn`: run as a Tokio task on the async worker pool (default).
/// - `Blocking`: run on Tokio's blocking thread pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    Inline,
    Spawn,
    Blocking,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext::Spawn
    }
}

impl FromStr for ExecutionContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(ExecutionContext::Inline),
            "spawn" => Ok(ExecutionContext::Spawn),
            "blocking" => Ok(ExecutionContext::Blocking),
            other => Err(format!(
                "invalid execution context: {other} (expected \"inline\", \"spawn\" or \"blocking\")"
            )),
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionContext::Inline => "inline",
            ExecutionContext::Spawn => "spawn",
            ExecutionContext::Blocking => "blocking",
        };
        f.write_str(s)
    }
}
