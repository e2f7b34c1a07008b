use crossbeam_channel::{Receiver, Sender};
use focusgen_core::{Record, Schedule};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::model::{WorkerExit, WorkerReport};
use crate::transform::Transform;

/// One member of the fixed-size pool. Interchangeable with its peers.
pub(crate) struct Worker<'a, T: Transform + ?Sized> {
    id: usize,
    schedule: &'a Schedule,
    transform: &'a T,
    rng: ChaCha8Rng,
}

impl<'a, T: Transform + ?Sized> Worker<'a, T> {
    pub(crate) fn new(id: usize, schedule: &'a Schedule, transform: &'a T, seed: u64) -> Self {
        Self {
            id,
            schedule,
            transform,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Walk the schedule, pulling `rows_per_worker` templates per slot.
    ///
    /// Leaves as soon as the work queue is closed and empty. Never closes
    /// the result queue; dropping `results` only releases this worker's
    /// handle.
    pub(crate) fn run(mut self, jobs: Receiver<Record>, results: Sender<Record>) -> WorkerReport {
        let schedule = self.schedule;
        let mut rows = 0u64;
        for (ctx, count) in schedule.contexts() {
            for _ in 0..count {
                let Ok(template) = jobs.recv() else {
                    debug!(worker = self.id, rows, "work queue closed mid-schedule");
                    return self.report(rows, WorkerExit::SourceDrained);
                };
                let output = self.transform.apply(template, &ctx, &mut self.rng);
                if results.send(output).is_err() {
                    return self.report(rows, WorkerExit::CollectorClosed);
                }
                rows += 1;
            }
        }
        self.report(rows, WorkerExit::ScheduleComplete)
    }

    fn report(&self, rows: u64, exit: WorkerExit) -> WorkerReport {
        match exit {
            WorkerExit::ScheduleComplete => {
                info!(worker = self.id, rows, reason = ?exit, "worker exited")
            }
            _ => warn!(worker = self.id, rows, reason = ?exit, "worker stopped early"),
        }
        WorkerReport {
            worker: self.id,
            rows,
            exit,
        }
    }
}
