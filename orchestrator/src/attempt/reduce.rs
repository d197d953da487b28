use crate::types::{ReplicationOutput, SyncOutput, SyncSummary};

/// Reduces the detailed worker output into the caller-facing sync output.
///
/// A lossless field-by-field projection: no field is transformed beyond moving it over,
/// and the result shares no ownership with the worker output. Backfill marking and
/// payload offloading are applied by the supervisor afterwards.
pub fn reduce(raw: ReplicationOutput) -> SyncOutput {
    let summary = SyncSummary {
        bytes_synced: raw.summary.bytes_synced,
        records_synced: raw.summary.records_synced,
        start_time: raw.summary.start_time,
        end_time: raw.summary.end_time,
        status: raw.summary.status,
        total_stats: raw.summary.total_stats,
        stream_stats: raw.summary.stream_stats,
        performance_metrics: raw.summary.performance_metrics,
    };

    SyncOutput {
        state: raw.state,
        output_catalog: raw.output_catalog,
        summary,
        failures: raw.failures,
        backfilled_streams: Vec::new(),
        payload_reference: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_replication_output;

    #[test]
    fn preserves_every_summary_field_exactly() {
        let raw = sample_replication_output();
        let expected = raw.clone();

        let output = reduce(raw);

        assert_eq!(output.summary.bytes_synced, expected.summary.bytes_synced);
        assert_eq!(output.summary.records_synced, expected.summary.records_synced);
        assert_eq!(output.summary.start_time, expected.summary.start_time);
        assert_eq!(output.summary.end_time, expected.summary.end_time);
        assert_eq!(output.summary.status, expected.summary.status);
        assert_eq!(output.summary.total_stats, expected.summary.total_stats);
        assert_eq!(output.summary.stream_stats, expected.summary.stream_stats);
        assert_eq!(
            output.summary.performance_metrics,
            expected.summary.performance_metrics
        );
    }

    #[test]
    fn carries_state_catalog_and_failures_through() {
        let raw = sample_replication_output();
        let expected = raw.clone();

        let output = reduce(raw);

        assert_eq!(output.state, expected.state);
        assert_eq!(output.output_catalog, expected.output_catalog);
        assert_eq!(output.failures, expected.failures);
    }

    #[test]
    fn starts_with_no_backfill_and_no_payload_reference() {
        let output = reduce(sample_replication_output());

        assert!(output.backfilled_streams.is_empty());
        assert!(output.payload_reference.is_none());
    }
}
