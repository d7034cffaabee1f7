use std::time::Duration;

/// Continuation signal returned by a generator stage's step callable
///
/// `Continue` means the record just produced should be forwarded and the step
/// called again; `Done` means the record just produced is the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Continue,
    Done,
}

impl Signal {
    /// Map a "done" flag onto a signal (`true` → `Done`)
    pub fn from_done(done: bool) -> Self {
        if done {
            Signal::Done
        } else {
            Signal::Continue
        }
    }

    pub fn is_done(self) -> bool {
        self == Signal::Done
    }
}

impl From<bool> for Signal {
    fn from(done: bool) -> Self {
        Signal::from_done(done)
    }
}

/// Running counters kept by every stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Calls to `execute`
    pub executions: u64,

    /// Calls to `forward`, counted whether or not a successor is linked
    pub forwarded: u64,
}

impl StageStats {
    /// Counter growth since an earlier snapshot
    pub fn since(&self, earlier: &StageStats) -> StageStats {
        StageStats {
            executions: self.executions.saturating_sub(earlier.executions),
            forwarded: self.forwarded.saturating_sub(earlier.forwarded),
        }
    }
}

/// Per-stage activity during one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Stage name
    pub stage_name: String,

    /// Times the stage's `execute` ran during the run
    pub executions: u64,

    /// Records the stage forwarded during the run
    pub forwarded: u64,
}

impl StageReport {
    pub fn new(stage_name: impl Into<String>, stats: StageStats) -> Self {
        Self {
            stage_name: stage_name.into(),
            executions: stats.executions,
            forwarded: stats.forwarded,
        }
    }
}

/// Result of pushing one record through a pipeline
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Pipeline name
    pub pipeline_name: String,

    /// Wall time spent inside the head's `execute`
    pub duration: Duration,

    /// Activity of each stage, head first; empty when stats collection is off
    pub stage_reports: Vec<StageReport>,
}

impl RunReport {
    pub fn new(
        pipeline_name: impl Into<String>,
        duration: Duration,
        stage_reports: Vec<StageReport>,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            duration,
            stage_reports,
        }
    }

    /// Records that reached the last stage of the chain
    pub fn records_delivered(&self) -> u64 {
        self.stage_reports
            .last()
            .map(|r| r.executions)
            .unwrap_or(0)
    }

    /// Find a stage report by stage name
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stage_reports.iter().find(|r| r.stage_name == name)
    }

    /// Total `execute` calls across all stages
    pub fn total_executions(&self) -> u64 {
        self.stage_reports.iter().map(|r| r.executions).sum()
    }
}
