/* 📖 # Why have pathkit_base as a core library?
pathkit_base provides the foundational error handling and tracing setup used across all crates.
This ensures consistency in error handling and keeps the path library free of subscriber wiring.
*/

pub mod error;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, PathkitError, PathkitResult, ResultExt, TransferStage};
