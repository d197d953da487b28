use serde::{Deserialize, Serialize};

/// Identifies a stream within a catalog.
///
/// The namespace+name pair is the value key of a stream: two descriptors are the same
/// stream if and only if both components are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamDescriptor {
    pub name: String,
    pub namespace: Option<String>,
}

impl StreamDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

/// How records of a stream are moved to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Every sync re-reads the full stream.
    FullRefresh,
    /// Syncs resume from the stored cursor state.
    Incremental,
}

/// A stream as configured for replication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfiguredStream {
    pub name: String,
    pub namespace: Option<String>,
    pub sync_mode: SyncMode,
    /// Field paths forming the primary key, empty when the stream has none.
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl ConfiguredStream {
    /// Returns the value key identifying this stream.
    pub fn descriptor(&self) -> StreamDescriptor {
        StreamDescriptor {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// The set of streams configured for a replication connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Catalog {
    pub streams: Vec<ConfiguredStream>,
}

impl Catalog {
    /// Returns whether the catalog contains a stream with the given descriptor.
    pub fn contains(&self, descriptor: &StreamDescriptor) -> bool {
        self.streams
            .iter()
            .any(|stream| stream.name == descriptor.name && stream.namespace == descriptor.namespace)
    }
}
