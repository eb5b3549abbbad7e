//! AI capability ports backed by the `claude` CLI.

pub mod claude;

pub use crate::claude::ClaudeCli;
