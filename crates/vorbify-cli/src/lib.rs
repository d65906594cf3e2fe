//! vorbify CLI library.
//!
//! This crate provides the batch conversion used by the `vorbify` binary:
//! input path handling, single-file conversion and the reporting command.

pub mod commands;
pub mod convert;
pub mod input;
