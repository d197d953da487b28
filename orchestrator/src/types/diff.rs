use serde::{Deserialize, Serialize};

use crate::types::stream::StreamDescriptor;

/// A single field-level change reported by a schema refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldTransform {
    /// Dot-separated path of the affected field.
    pub field: String,
    pub kind: FieldTransformKind,
}

/// The kind of change applied to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldTransformKind {
    AddField { required: bool },
    RemoveField,
    UpdateFieldSchema,
    UpdatePrimaryKey,
}

impl FieldTransform {
    /// Returns whether this change breaks already-synced data for the stream.
    ///
    /// A newly added required field, a field type change and a primary-key change all
    /// invalidate previously written records; optional additions and removals do not.
    pub fn is_breaking(&self) -> bool {
        match self.kind {
            FieldTransformKind::AddField { required } => required,
            FieldTransformKind::RemoveField => false,
            FieldTransformKind::UpdateFieldSchema => true,
            FieldTransformKind::UpdatePrimaryKey => true,
        }
    }
}

/// The kind of change applied to a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamTransformKind {
    AddStream,
    RemoveStream,
    UpdateStream,
}

/// A stream-level change reported by a schema refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamTransform {
    pub kind: StreamTransformKind,
    pub stream: StreamDescriptor,
    #[serde(default)]
    pub field_transforms: Vec<FieldTransform>,
}

impl StreamTransform {
    /// Returns whether the transformed stream must be fully re-synced.
    ///
    /// Only updates to an existing stream can require a backfill; added streams start
    /// from scratch anyway and removed streams have nothing left to sync.
    pub fn requires_backfill(&self) -> bool {
        matches!(self.kind, StreamTransformKind::UpdateStream)
            && self
                .field_transforms
                .iter()
                .any(FieldTransform::is_breaking)
    }
}

/// Catalog changes detected between two schema refreshes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchemaDiff {
    pub transforms: Vec<StreamTransform>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_stream(field_transforms: Vec<FieldTransform>) -> StreamTransform {
        StreamTransform {
            kind: StreamTransformKind::UpdateStream,
            stream: StreamDescriptor::new("users"),
            field_transforms,
        }
    }

    #[test]
    fn required_field_addition_is_breaking() {
        let transform = update_stream(vec![FieldTransform {
            field: "email".to_string(),
            kind: FieldTransformKind::AddField { required: true },
        }]);

        assert!(transform.requires_backfill());
    }

    #[test]
    fn optional_field_addition_and_removal_are_benign() {
        let transform = update_stream(vec![
            FieldTransform {
                field: "nickname".to_string(),
                kind: FieldTransformKind::AddField { required: false },
            },
            FieldTransform {
                field: "legacy_id".to_string(),
                kind: FieldTransformKind::RemoveField,
            },
        ]);

        assert!(!transform.requires_backfill());
    }

    #[test]
    fn type_and_primary_key_changes_are_breaking() {
        for kind in [
            FieldTransformKind::UpdateFieldSchema,
            FieldTransformKind::UpdatePrimaryKey,
        ] {
            let transform = update_stream(vec![FieldTransform {
                field: "id".to_string(),
                kind,
            }]);

            assert!(transform.requires_backfill());
        }
    }

    #[test]
    fn added_and_removed_streams_never_require_backfill() {
        for kind in [StreamTransformKind::AddStream, StreamTransformKind::RemoveStream] {
            let transform = StreamTransform {
                kind,
                stream: StreamDescriptor::new("users"),
                field_transforms: vec![FieldTransform {
                    field: "id".to_string(),
                    kind: FieldTransformKind::UpdatePrimaryKey,
                }],
            };

            assert!(!transform.requires_backfill());
        }
    }
}
