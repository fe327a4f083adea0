//! Runtime tunables.

/// Rows requested per Resource Graph query. Pagination is out of scope,
/// so a query returning more records than this is an error.
pub const GRAPH_PAGE_SIZE: usize = 1000;

/// Prefix for dated snapshot cache files.
pub const CACHE_FILE_PREFIX: &str = "snapshot_cache";

/// Safety cap on captured CLI output.
pub const MAX_CLI_OUTPUT_BYTES: usize = 5_000_000;
