use std::future::Future;

use crate::error::HydrationError;
use crate::types::{AttemptRequest, ReplicationSpec};

/// Collaborator that expands a lightweight [`AttemptRequest`] into a full
/// [`ReplicationSpec`].
///
/// The hydration service resolves the configured catalog, the cursor state of the
/// previous attempt and the connector secrets. It is invoked exactly once per attempt,
/// and a failure aborts the attempt before any worker is constructed.
pub trait SpecHydrator {
    fn hydrate(
        &self,
        request: &AttemptRequest,
    ) -> impl Future<Output = Result<ReplicationSpec, HydrationError>> + Send;
}
