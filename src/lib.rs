//! termkit - terminal utility aggregator
//!
//! One binary, four command categories (system, network, filelab, utils),
//! each subcommand a self-contained call-and-format operation. The library
//! surface exists so integration tests and the binary share the same
//! dispatch path.

pub mod cli;
pub mod commands;
pub mod config;
pub mod exitcode;
