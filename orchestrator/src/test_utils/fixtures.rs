use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::types::{
    AttemptRequest, Catalog, ConfiguredStream, ConnectorSpec, FieldTransform, FieldTransformKind,
    JobRunConfig, ReplicationAttemptSummary, ReplicationOutput, ReplicationSpec,
    ReplicationStatus, SchemaDiff, StreamDescriptor, StreamSyncStats, StreamTransform,
    StreamTransformKind, SyncMode, SyncStats,
};

fn timestamp(value: &str) -> DateTime<Utc> {
    value.parse().expect("invalid fixture timestamp")
}

/// A catalog with two configured streams, `public.users` and `public.orders`.
pub fn sample_catalog() -> Catalog {
    Catalog {
        streams: vec![
            ConfiguredStream {
                name: "users".to_string(),
                namespace: Some("public".to_string()),
                sync_mode: SyncMode::Incremental,
                primary_key: vec!["id".to_string()],
            },
            ConfiguredStream {
                name: "orders".to_string(),
                namespace: Some("public".to_string()),
                sync_mode: SyncMode::FullRefresh,
                primary_key: vec![],
            },
        ],
    }
}

pub fn sample_request() -> AttemptRequest {
    AttemptRequest {
        connection_id: Uuid::parse_str("6f2f3d3e-7a10-4e6f-9b64-2b8f5f9d8a11").unwrap(),
        job_id: 42,
        attempt_number: 1,
        source_image: "source-postgres:1.2.0".to_string(),
        destination_image: "destination-warehouse:3.4.0".to_string(),
        is_reset: false,
        use_remote_dispatch: None,
        schema_diff: None,
    }
}

pub fn sample_spec() -> ReplicationSpec {
    ReplicationSpec {
        catalog: sample_catalog(),
        state: Some(json!({"cursor": "2024-05-01T00:00:00Z"})),
        source: ConnectorSpec {
            image: "source-postgres:1.2.0".to_string(),
            config: r#"{"host":"db.internal","password":"hunter2"}"#.into(),
        },
        destination: ConnectorSpec {
            image: "destination-warehouse:3.4.0".to_string(),
            config: r#"{"dataset":"replication","credentials":"svc-account"}"#.into(),
        },
        job_run: JobRunConfig {
            job_id: 42,
            attempt_number: 1,
        },
    }
}

pub fn sample_replication_output() -> ReplicationOutput {
    let users = StreamDescriptor::with_namespace("users", "public");
    let orders = StreamDescriptor::with_namespace("orders", "public");

    ReplicationOutput {
        state: Some(json!({"cursor": "2024-05-01T10:00:00Z"})),
        output_catalog: sample_catalog(),
        summary: ReplicationAttemptSummary {
            bytes_synced: 4_096_000,
            records_synced: 12_500,
            start_time: timestamp("2024-05-01T10:00:00Z"),
            end_time: timestamp("2024-05-01T10:05:30Z"),
            status: ReplicationStatus::Completed,
            total_stats: SyncStats {
                records_emitted: 12_500,
                bytes_emitted: 4_096_000,
                records_committed: 12_500,
                bytes_committed: 4_096_000,
            },
            stream_stats: vec![
                StreamSyncStats {
                    stream: users,
                    stats: SyncStats {
                        records_emitted: 10_000,
                        bytes_emitted: 3_000_000,
                        records_committed: 10_000,
                        bytes_committed: 3_000_000,
                    },
                },
                StreamSyncStats {
                    stream: orders,
                    stats: SyncStats {
                        records_emitted: 2_500,
                        bytes_emitted: 1_096_000,
                        records_committed: 2_500,
                        bytes_committed: 1_096_000,
                    },
                },
            ],
            performance_metrics: Some(json!({"records_per_second": 37.9})),
        },
        failures: vec![],
    }
}

/// A diff with a breaking change on `public.users`, a benign change on `public.orders`
/// and a breaking change on a stream absent from [`sample_catalog`].
pub fn breaking_diff() -> SchemaDiff {
    SchemaDiff {
        transforms: vec![
            StreamTransform {
                kind: StreamTransformKind::UpdateStream,
                stream: StreamDescriptor::with_namespace("users", "public"),
                field_transforms: vec![FieldTransform {
                    field: "id".to_string(),
                    kind: FieldTransformKind::UpdateFieldSchema,
                }],
            },
            StreamTransform {
                kind: StreamTransformKind::UpdateStream,
                stream: StreamDescriptor::with_namespace("orders", "public"),
                field_transforms: vec![FieldTransform {
                    field: "note".to_string(),
                    kind: FieldTransformKind::AddField { required: false },
                }],
            },
            StreamTransform {
                kind: StreamTransformKind::UpdateStream,
                stream: StreamDescriptor::with_namespace("archived", "public"),
                field_transforms: vec![FieldTransform {
                    field: "id".to_string(),
                    kind: FieldTransformKind::UpdatePrimaryKey,
                }],
            },
        ],
    }
}

/// Writes an executable shell script to a unique temp path and returns the path.
pub fn write_executable_script(contents: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = std::env::temp_dir().join(format!("replication-worker-{}.sh", Uuid::new_v4()));
    std::fs::write(&path, contents).expect("failed to write test script");

    let mut permissions = std::fs::metadata(&path)
        .expect("failed to stat test script")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).expect("failed to chmod test script");

    path
}
