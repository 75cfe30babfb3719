//! CLI library for voxpad.
//!
//! The binary in `main.rs` parses arguments and dispatches; everything
//! reusable (parser types, path resolution) lives here so tests can
//! exercise it without spawning a process.

pub mod commands;
pub mod parser;
pub mod paths;

pub use commands::{Commands, ServeArgs};
pub use parser::Cli;
pub use paths::{PathError, ResolvedPaths};
