#![warn(missing_docs)]

//! Provides shared utilities for the NBT tools.

/// Configures log4rs for the command line tool.
pub mod logging;
