// src/job/command.rs

//! Shell-command job bodies.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::JobError;
use crate::job::WorkResult;

/// Run `cmd` through the platform shell and wait for it to exit.
///
/// stdout/stderr are consumed line by line and logged at debug so the pipes
/// never fill up. A non-zero exit becomes [`JobError::Exited`].
pub async fn run_command(cmd: String) -> WorkResult {
    info!(cmd = %cmd, "starting job process");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&cmd);
        c
    };

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for command '{cmd}'"))?;

    if let Some(stdout) = child.stdout.take() {
        let cmd = cmd.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd, "stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let cmd = cmd.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of command '{cmd}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(
        cmd = %cmd,
        exit_code = code,
        success = status.success(),
        "job process exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(JobError::Exited(code))
    }
}
