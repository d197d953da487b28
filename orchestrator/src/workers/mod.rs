mod base;
mod process;
mod remote;

pub use base::*;
pub use process::*;
pub use remote::*;
