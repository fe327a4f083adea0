//! Snapshot cache management.
//!
//! Collecting a snapshot takes four Resource Graph round trips; the result
//! is cached as dated JSON so re-runs (and the test suite) stay offline.

use super::graph::{run_az_graph_snapshot, Snapshot};
use crate::config;
use std::error::Error;
use std::path::Path;

/// Read a topology snapshot from a cache file, or collect one from Azure
/// if today's cache does not exist yet.
///
/// # Arguments
/// * `cache_file` - Optional explicit cache path. If None, uses the
///   default dated naming.
///
/// # Returns
/// * `Ok(Snapshot)` - The snapshot from cache or Azure
/// * `Err` - If an explicit cache file is missing, or collection fails
pub fn read_snapshot_cache(cache_file: Option<&str>) -> Result<Snapshot, Box<dyn Error>> {
    let cache_file = match cache_file {
        Some(file) => {
            if !Path::new(file).exists() {
                return Err(format!("Cache file does not exist: {file}").into());
            }
            log::info!("Using provided cache file: {file}");
            file.to_string()
        }
        None => format!(
            "{prefix}_{date}.json",
            prefix = config::CACHE_FILE_PREFIX,
            date = chrono::Utc::now().format("%Y-%m-%d")
        ),
    };

    let snapshot = match std::fs::read_to_string(&cache_file) {
        Ok(json) => {
            log::info!("Reading from cache file: {cache_file}");
            serde_json::from_str(&json)
                .map_err(|e| format!("Error parsing cache JSON {cache_file}: {e}"))?
        }
        Err(_) => {
            log::warn!("Cache file not found: {cache_file}");
            let snapshot = run_az_graph_snapshot()?;
            log::info!(
                "Collected {count} resources from az graph query",
                count = snapshot.resource_count()
            );

            let json = serde_json::to_string(&snapshot)
                .map_err(|e| format!("Error serializing snapshot: {e}"))?;
            log::warn!("Writing snapshot to cache file: {cache_file}");
            std::fs::write(&cache_file, json)
                .map_err(|e| format!("Error writing cache file {cache_file}: {e}"))?;
            snapshot
        }
    };

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_snapshot_cache_fixture() {
        let snapshot = read_snapshot_cache(Some("src/tests/test_data/snapshot_lab_01.json"))
            .expect("Error reading snapshot cache");
        assert_eq!(snapshot.virtual_networks.len(), 1);
        assert_eq!(snapshot.virtual_networks[0].name, "vnet-egress-lab");
        assert_eq!(snapshot.virtual_networks[0].subnets.len(), 8);
        assert!(snapshot.collected_at.is_some());
    }

    #[test]
    fn test_missing_explicit_cache_file_is_an_error() {
        let err = read_snapshot_cache(Some("src/tests/test_data/does_not_exist.json"))
            .expect_err("Expected missing cache error");
        assert!(err.to_string().contains("does not exist"));
    }
}
