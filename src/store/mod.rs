//! Persistence for Ultra
//!
//! Every record is a small JSON document in the config directory.

pub mod json_file;
mod session_table;
mod user_table;

pub use json_file::StoreError;
pub use session_table::SessionTable;
pub use user_table::UserTable;
