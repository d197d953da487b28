use std::collections::BTreeSet;

use crate::types::{Catalog, SchemaDiff, StreamDescriptor, SyncOutput};

/// Resolves the streams that must be fully re-synced after a schema change.
///
/// A stream is included when the diff carries a transform that requires a backfill and
/// the transformed stream still exists in the configured catalog; transforms targeting
/// streams that were removed from the catalog are ignored. Pure and deterministic.
pub fn streams_to_backfill(diff: &SchemaDiff, catalog: &Catalog) -> BTreeSet<StreamDescriptor> {
    diff.transforms
        .iter()
        .filter(|transform| transform.requires_backfill())
        .map(|transform| transform.stream.clone())
        .filter(|descriptor| catalog.contains(descriptor))
        .collect()
}

/// Records the resolved backfill set on a sync output.
///
/// Marking only: which streams were fully refreshed during this attempt. It does not
/// trigger any re-execution.
pub fn mark_backfilled_streams(streams: &BTreeSet<StreamDescriptor>, output: &mut SyncOutput) {
    output.backfilled_streams = streams.iter().cloned().collect();
}
