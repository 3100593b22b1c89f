//! # meroxa-cli
//!
//! The `meroxa` command-line tool.
//!
//! Every command is a descriptor assembled by `meroxa-builder`; this crate
//! holds the descriptors, the tables they print and the wiring that turns
//! the global flags into a [`meroxa_builder::Session`].
//!
//! ```text
//! argv ──► Cli::parse_from ──► Invocation ──► pre-steps ──► execute ──► post-steps
//!                                   │
//!                         GlobalFlags ──► build_session
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod display;
pub mod session;
pub mod update;

pub use commands::{root, GlobalFlags};
pub use session::build_session;
