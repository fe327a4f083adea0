//! Audit Azure virtual networks for subnets that rely on implicit
//! default outbound internet access, ahead of its deprecation.
//!
//! The core is a pure classification engine ([`engine::classify`]) over a
//! collected topology snapshot; detection heuristics are versioned
//! policies ([`policy::PolicyVersion`]) selectable side by side.

pub mod azure;
mod config;
pub mod engine;
pub mod models;
pub mod output;
pub mod policy;

use azure::Snapshot;
use engine::Classification;
use models::{normalize_id, TopologyModel};
use policy::PolicyVersion;
use std::error::Error;

/// Classify every VNet in a snapshot under one policy.
///
/// Verdicts from all VNets are merged and stably sorted by
/// (vnet id, subnet id) so report order never depends on collection
/// order.
pub fn audit(snapshot: &Snapshot, policy: PolicyVersion) -> Classification {
    let mut combined = Classification::new(policy);

    for vnet in &snapshot.virtual_networks {
        log::info!("Classifying vnet: {vnet}");
        let topology = TopologyModel::for_vnet(
            vnet.clone(),
            &snapshot.route_tables,
            &snapshot.network_interfaces,
            &snapshot.load_balancers,
        );
        let result = engine::classify(&topology, policy);
        combined.verdicts.extend(result.verdicts);
        combined.errors.extend(result.errors);
    }

    combined
        .verdicts
        .sort_by_key(|v| (normalize_id(&v.vnet_id), normalize_id(&v.subnet_id)));

    combined
}

/// Read (or collect) a snapshot and classify it under one policy.
///
/// # Arguments
/// * `cache_file` - Optional explicit snapshot cache path
/// * `policy` - The rule-set version to apply
pub fn audit_snapshot(
    cache_file: Option<&str>,
    policy: PolicyVersion,
) -> Result<Classification, Box<dyn Error>> {
    let snapshot = azure::read_snapshot_cache(cache_file)?;
    Ok(audit(&snapshot, policy))
}
