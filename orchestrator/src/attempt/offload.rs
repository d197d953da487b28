use metrics::counter;
use tracing::{debug, info, warn};

use crate::metrics::{FAILURE_CAUSE, PAYLOAD_WRITE_FAILURES_TOTAL, REFERENCE_ID, REFERENCE_VERSION};
use crate::storage::PayloadStore;
use crate::types::{PayloadReference, SyncOutput};

/// Finalizes a sync output against the in-band size ceiling.
///
/// An output within the limit is returned untouched and no storage write happens. An
/// oversized output is logged (observability only, the output is still returned
/// in-band) and, when offload is enabled for the connection, written once to the
/// payload store under the deterministic key of `reference`. The reference is attached
/// only after a successful write; a failed write is swallowed, counted and leaves the
/// output byte-identical to its input. Offload never blocks or fails the attempt.
pub async fn finalize<P>(
    output: SyncOutput,
    reference: &PayloadReference,
    size_limit: usize,
    offload_enabled: bool,
    store: &P,
) -> SyncOutput
where
    P: PayloadStore,
{
    let serialized = match serde_json::to_vec(&output) {
        Ok(serialized) => serialized,
        Err(err) => {
            warn!("failed to serialize the sync output for the size check: {err}");
            return output;
        }
    };

    if serialized.len() <= size_limit {
        debug!(
            size = serialized.len(),
            size_limit, "sync output fits within the in-band size limit"
        );

        return output;
    }

    warn!(
        size = serialized.len(),
        size_limit, "sync output exceeds the in-band size limit"
    );

    if !offload_enabled {
        return output;
    }

    match store.put(&reference.storage_key(), &serialized).await {
        Ok(()) => {
            info!(
                reference_id = %reference.id,
                "offloaded the full sync output to the payload store"
            );

            let mut output = output;
            output.payload_reference = Some(reference.clone());

            output
        }
        Err(err) => {
            warn!("failed to offload the sync output, returning it in-band unchanged: {err}");

            counter!(
                PAYLOAD_WRITE_FAILURES_TOTAL,
                REFERENCE_ID => reference.id.clone(),
                REFERENCE_VERSION => reference.version.clone(),
                FAILURE_CAUSE => err.cause_label()
            )
            .increment(1);

            output
        }
    }
}
