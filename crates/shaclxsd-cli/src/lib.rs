//! # shaclxsd CLI library
//!
//! Command definitions and handlers behind the `shaclxsd` binary.

pub mod commands;

pub use commands::*;
