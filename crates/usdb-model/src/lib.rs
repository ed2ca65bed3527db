pub mod song;
pub mod invocation;

pub use song::*;
pub use invocation::*;
