use crate::error::HydrationError;
use crate::hydration::SpecHydrator;
use crate::types::{AttemptRequest, ReplicationSpec};

/// Hydrator that always returns a clone of a fixed spec.
#[derive(Debug, Clone)]
pub struct StaticHydrator {
    spec: ReplicationSpec,
}

impl StaticHydrator {
    pub fn new(spec: ReplicationSpec) -> Self {
        Self { spec }
    }
}

impl SpecHydrator for StaticHydrator {
    async fn hydrate(&self, _request: &AttemptRequest) -> Result<ReplicationSpec, HydrationError> {
        Ok(self.spec.clone())
    }
}

/// Hydrator that always fails with an unreachable dependency.
#[derive(Debug, Clone, Copy)]
pub struct FailingHydrator;

impl SpecHydrator for FailingHydrator {
    async fn hydrate(&self, _request: &AttemptRequest) -> Result<ReplicationSpec, HydrationError> {
        Err(HydrationError::DependencyUnavailable(
            "secret store is unreachable".to_string(),
        ))
    }
}
