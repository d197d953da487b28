mod backfill;
mod offload;
mod reduce;
mod supervisor;

pub use backfill::*;
pub use offload::*;
pub use reduce::*;
pub use supervisor::*;
