use rayon::prelude::*;

use crate::foundation::core::Raster;
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::prepare::pipeline::{OverlayPreparer, PreparedOverlay};
use crate::signature::cache::PreparationTicket;

/// Threading options for [`prepare_batch`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct BatchOpts {
    /// Worker thread count. `None` lets rayon pick.
    pub threads: Option<usize>,
}

/// Input of one preparation job.
#[derive(Clone, Debug)]
pub enum PrepareInput {
    /// Encoded image bytes.
    Bytes(Vec<u8>),
    /// Already decoded pixels.
    Raster(Raster),
}

/// One job of a batch.
#[derive(Clone, Debug)]
pub struct PrepareRequest {
    /// Hotspot and content signature the job was started for.
    pub ticket: PreparationTicket,
    /// Pixels to prepare.
    pub input: PrepareInput,
    /// Whether the output must carry transparency.
    pub enforce_transparency: bool,
}

/// Result of one job, tagged with its ticket so the caller can check staleness.
#[derive(Debug)]
pub struct PrepareOutcome {
    /// Ticket of the originating request.
    pub ticket: PreparationTicket,
    /// Pipeline result.
    pub result: OverlayerResult<PreparedOverlay>,
}

/// Prepare several overlays in parallel. Outcomes keep the order of `requests`.
///
/// Each job owns its raster; failures are reported per job and never abort the batch.
#[tracing::instrument(skip(preparer, requests), fields(jobs = requests.len()))]
pub fn prepare_batch(
    preparer: &OverlayPreparer,
    requests: Vec<PrepareRequest>,
    opts: &BatchOpts,
) -> OverlayerResult<Vec<PrepareOutcome>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }
    let pool = build_thread_pool(opts.threads)?;
    let outcomes = pool.install(|| {
        requests
            .into_par_iter()
            .map(|req| {
                let result = match req.input {
                    PrepareInput::Bytes(bytes) => {
                        preparer.prepare(&bytes, req.enforce_transparency)
                    }
                    PrepareInput::Raster(raster) => {
                        preparer.prepare_raster(raster, req.enforce_transparency)
                    }
                };
                if let Err(e) = &result {
                    tracing::debug!(mark = %req.ticket.mark_id, error = %e, "preparation failed");
                }
                PrepareOutcome {
                    ticket: req.ticket,
                    result,
                }
            })
            .collect()
    });
    Ok(outcomes)
}

fn build_thread_pool(threads: Option<usize>) -> OverlayerResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(OverlayerError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| OverlayerError::Other(anyhow::anyhow!("failed to build thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/batch.rs"]
mod tests;
