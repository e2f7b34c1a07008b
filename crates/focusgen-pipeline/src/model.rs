use serde::{Deserialize, Serialize};

/// Why a worker left its schedule loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerExit {
    /// Every (month, provider) slot was filled.
    ScheduleComplete,
    /// The work queue was closed and drained mid-schedule.
    SourceDrained,
    /// The collector stopped receiving results.
    CollectorClosed,
}

/// Per-worker summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub rows: u64,
    pub exit: WorkerExit,
}

/// Report for an enrichment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub seed: u64,
    pub workers: usize,
    pub batch_size: usize,
    pub months: usize,
    pub providers: Vec<String>,
    /// Rows the schedule asks for if the source never runs dry.
    pub demand: u64,
    /// Template records pushed onto the work queue.
    pub records_read: u64,
    pub rows_written: u64,
    pub batches: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,
    pub duration_ms: u64,
    pub worker_reports: Vec<WorkerReport>,
}

impl RunReport {
    /// Rows produced by the worker pool.
    pub fn rows_produced(&self) -> u64 {
        self.worker_reports.iter().map(|report| report.rows).sum()
    }
}
