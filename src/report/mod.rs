//! Result renderers.
//!
//! - [`terminal`]: coloured status line plus tables of copied files and
//!   failures; respects `--verbose` / `--quiet`.
//! - JSON output is the serialized [`CommandResult`](crate::commands::CommandResult)
//!   and is printed directly from `main`.

pub mod terminal;
