pub mod judge;
pub mod loader;
pub mod result;
pub mod runner;
pub mod testcase;

pub use judge::*;
pub use loader::{load, LoadError};
pub use result::*;
pub use runner::{ExecStatus, ExecutionOutcome, Invocation, RunError};
pub use testcase::*;
