//! Library surface for the `bravepipe` binary.
//!
//! The binary (`src/main.rs`) hosts the CLI and the MCP stdio server; the tool
//! logic both of them call lives in [`tools`].

pub mod tools;

pub use bravepipe_core as core;
pub use tools::Toolbox;
