use crossbeam_channel::Sender;
use focusgen_core::Record;
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::source::RecordSource;

/// Push every source record onto the work queue, then close it.
///
/// The queue is closed exactly once, when `jobs` drops at the end of this
/// function, whether the source ran dry, failed, or every worker already
/// left. Returns the number of records pushed.
pub(crate) fn dispatch<S>(source: &mut S, jobs: Sender<Record>) -> Result<u64, PipelineError>
where
    S: RecordSource + ?Sized,
{
    let mut pushed = 0u64;
    loop {
        let record = match source.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(err) => {
                debug!(pushed, "source failed; closing work queue");
                return Err(err);
            }
        };
        if jobs.send(record).is_err() {
            debug!(pushed, "all workers exited; stopping source early");
            break;
        }
        pushed += 1;
    }

    info!(records = pushed, "source drained; closing work queue");
    Ok(pushed)
}
