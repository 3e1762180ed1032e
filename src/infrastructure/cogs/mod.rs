//! Cog loading from disk
//! 
//! Each cog lives in its own directory under the cogs root with a `cog.yaml`
//! manifest. The code is either a shared library exporting the cog entry
//! symbol or one of the builtin cogs compiled into the host.

pub mod loader;
pub mod manifest;

pub use loader::{BuiltinSource, DirectorySource, CogEntryFn, ENTRY_SYMBOL};
pub use manifest::{CogManifest, MANIFEST_FILE};
