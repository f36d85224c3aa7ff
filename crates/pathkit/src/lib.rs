/* 📖 # What is pathkit?

A filesystem path value with lexical path algebra, thin OS delegations and a
buffered transfer engine for copying, appending, reading and writing files.

`FilePath` wraps the path text and never touches the filesystem on its own;
every query goes to the OS at the moment it is called. The transfer functions
report how many bytes reached the destination, also when they fail.
*/

pub mod config;
mod copy;
pub mod env;
mod lexical;
mod ops;
mod path;
mod pattern;
pub mod transfer;

pub use config::{DEFAULT_BUFFER_SIZE, DEFAULT_PERMISSIONS};
pub use copy::CopyReport;
pub use env::{Environment, temp_dir, user_cache_dir, user_config_dir, user_home_dir};
pub use path::{FilePath, split_list};
pub use pathkit_base::{ErrorKind, PathkitError, PathkitResult, ResultExt, TransferStage};
pub use transfer::buffered_copy;
