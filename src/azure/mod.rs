//! Azure resource collection.
//!
//! The collector side of the tool - everything that talks to Azure:
//! - [`cli`] - Command execution for the Azure CLI
//! - [`graph`] - Resource Graph queries and model translation
//! - [`cache`] - Dated JSON caching of collected snapshots
//!
//! The classification engine never sees this module; it consumes the
//! [`Snapshot`] the collector hands over.

mod cache;
mod cli;
mod graph;

// Re-export public types and functions
pub use cache::read_snapshot_cache;
pub use cli::run;
pub use graph::{run_az_graph_snapshot, Snapshot};
