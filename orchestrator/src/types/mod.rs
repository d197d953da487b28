mod attempt;
mod diff;
mod output;
mod stream;

pub use attempt::*;
pub use diff::*;
pub use output::*;
pub use stream::*;
