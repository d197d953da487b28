pub mod attempt;
pub mod concurrency;
pub mod dispatch;
pub mod error;
pub mod hydration;
pub mod metrics;
pub mod storage;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod workers;
