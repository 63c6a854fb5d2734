use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bootdag::JobError;
use bootdag::engine::CompletionNotifier;
use bootdag::errors::Result;
use bootdag::exec::JobExecutor;
use bootdag::job::Job;

/// Every `launch` call, in order, as the list of job keys it carried.
pub type LaunchLog = Arc<Mutex<Vec<Vec<String>>>>;

pub fn launch_log() -> LaunchLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A fake executor that:
/// - records which jobs were launched, grouped per launch (i.e. per chunk)
/// - never runs job bodies
/// - immediately reports an outcome for each job, unless built with
///   [`FakeExecutor::manual`], in which case the test reports completions
///   itself through the notifier.
pub struct FakeExecutor {
    notifier: CompletionNotifier,
    launched: LaunchLog,
    failing: HashSet<String>,
    auto_complete: bool,
}

impl FakeExecutor {
    pub fn new(notifier: CompletionNotifier, launched: LaunchLog) -> Self {
        Self {
            notifier,
            launched,
            failing: HashSet::new(),
            auto_complete: true,
        }
    }

    /// Report these jobs as failed instead of succeeded.
    pub fn failing(mut self, keys: &[&str]) -> Self {
        self.failing.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    /// Only record launches; never report completions.
    pub fn manual(mut self) -> Self {
        self.auto_complete = false;
        self
    }
}

impl JobExecutor for FakeExecutor {
    fn launch(&mut self, jobs: Vec<Job>) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let keys: Vec<String> = jobs.iter().map(|j| j.key().to_string()).collect();
            self.launched.lock().unwrap().push(keys.clone());

            if self.auto_complete {
                for key in keys {
                    if self.failing.contains(&key) {
                        self.notifier
                            .notify_failure(&key, JobError::msg(format!("{key} failed")));
                    } else {
                        self.notifier.notify_success(&key);
                    }
                }
            }
            Ok(())
        })
    }
}
