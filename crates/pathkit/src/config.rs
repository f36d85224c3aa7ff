//! Compile-time defaults. There is no configuration file; runtime context is
//! passed explicitly through [`crate::Environment`] and log verbosity through
//! `RUST_LOG`.

/// Permission bits for directories created by the copy callers and for files
/// created by append, buffered read and buffered write.
pub const DEFAULT_PERMISSIONS: u32 = 0o755;

/// Buffer size offered to callers of the transfer functions. An invalid size
/// is rejected, never replaced by this value.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
