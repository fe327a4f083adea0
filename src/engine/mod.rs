//! Classification engine.
//!
//! Runs the selected policy over every subnet of a topology snapshot,
//! collecting verdicts and per-subnet errors into two ordered lists. One
//! subnet's failure never aborts its siblings, and nothing in here is
//! fatal to the process.

use crate::models::TopologyModel;
use crate::policy::{EvaluationError, Outcome, PolicyVersion, ReferenceKind, Verdict};
use itertools::Itertools;

/// One subnet's evaluation failure, or a reference failure that cannot
/// be pinned to a subnet (identity fields absent in that case).
#[derive(Debug, Clone, PartialEq)]
pub struct SubnetError {
    /// Id of the degraded subnet, when attributable.
    pub subnet_id: Option<String>,
    /// Name of the degraded subnet, when attributable.
    pub subnet_name: Option<String>,
    /// What went wrong.
    pub error: EvaluationError,
}

/// Result of classifying one topology (or several merged ones): the
/// verdicts the engine could produce plus the errors it ran into.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Rule-set version applied.
    pub policy: PolicyVersion,
    /// Verdicts for subnets with VM-attached NICs, in evaluation order.
    pub verdicts: Vec<Verdict>,
    /// Degraded subnets and unattributable reference failures.
    pub errors: Vec<SubnetError>,
}

impl Classification {
    /// An empty result for `policy`.
    pub fn new(policy: PolicyVersion) -> Classification {
        Classification {
            policy,
            verdicts: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Count of flagged subnets.
    pub fn flagged_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| v.outcome == Outcome::Flagged)
            .count()
    }
}

/// Classify every subnet of `topology` under `policy`.
///
/// Subnets with no VM-attached NIC are short-circuited (the deprecation
/// cannot affect them) and produce no verdict. A subnet whose evaluation
/// fails is recorded in the error list - "unknown", never "not flagged" -
/// and evaluation continues with the next subnet. Deterministic: the same
/// snapshot yields the same lists in the same order.
pub fn classify(topology: &TopologyModel, policy: PolicyVersion) -> Classification {
    let rule_set = policy.policy();
    let mut result = Classification::new(policy);

    // Backend pool members that resolve to nothing cannot be attributed
    // to a subnet; report them once per topology, before the per-subnet
    // pass.
    for (pool_id, member_id) in topology.unresolved_backend_members() {
        log::warn!(
            "vnet '{}': backend pool '{pool_id}' member '{member_id}' not found in snapshot",
            topology.vnet.name
        );
        result.errors.push(SubnetError {
            subnet_id: None,
            subnet_name: None,
            error: EvaluationError::UnresolvableReference {
                kind: ReferenceKind::BackendPoolMember,
                id: member_id,
            },
        });
    }

    for subnet in &topology.vnet.subnets {
        if topology.vm_attached_nics(subnet).is_empty() {
            log::debug!(
                "vnet '{}': skipping subnet '{}' (no VM-attached NIC)",
                topology.vnet.name,
                subnet.name
            );
            continue;
        }

        match rule_set.evaluate(subnet, topology) {
            Ok(verdict) => {
                if verdict.default_route_next_hops.iter().unique().count() > 1 {
                    result.errors.push(SubnetError {
                        subnet_id: Some(subnet.id.clone()),
                        subnet_name: Some(subnet.name.clone()),
                        error: EvaluationError::AmbiguousDefaultRoutes {
                            next_hop_types: verdict.default_route_next_hops.clone(),
                        },
                    });
                }
                if verdict.outcome != Outcome::NotApplicable {
                    result.verdicts.push(verdict);
                }
            }
            Err(error) => {
                log::warn!(
                    "vnet '{}': subnet '{}' evaluation degraded: {error}",
                    topology.vnet.name,
                    subnet.name
                );
                result.errors.push(SubnetError {
                    subnet_id: Some(subnet.id.clone()),
                    subnet_name: Some(subnet.name.clone()),
                    error,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NextHopType;
    use crate::policy::fixtures::*;
    use crate::policy::REASON_NO_EXPLICIT_EGRESS;

    #[test]
    fn test_failed_subnet_does_not_abort_siblings() {
        let mut broken = subnet("snet-broken");
        let nic_broken = vm_nic("nic-broken", &mut broken, false);
        broken.route_table_id = Some("rt-missing".to_string());

        let mut bare = subnet("snet-bare");
        let nic_bare = vm_nic("nic-bare", &mut bare, false);

        let topology = topology(
            vec![broken, bare],
            vec![],
            vec![nic_broken, nic_bare],
            vec![],
        );
        let result = classify(&topology, PolicyVersion::Refined);

        assert_eq!(result.verdicts.len(), 1);
        assert_eq!(result.verdicts[0].subnet_name, "snet-bare");
        assert_eq!(
            result.verdicts[0].reason.as_deref(),
            Some(REASON_NO_EXPLICIT_EGRESS)
        );
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].subnet_name.as_deref(), Some("snet-broken"));
    }

    #[test]
    fn test_subnets_without_vm_nics_produce_no_verdict() {
        let quiet = subnet("snet-quiet");
        let mut busy = subnet("snet-busy");
        let nic = vm_nic("nic-busy", &mut busy, true);
        let topology = topology(vec![quiet, busy], vec![], vec![nic], vec![]);

        let result = classify(&topology, PolicyVersion::Refined);
        assert_eq!(result.verdicts.len(), 1);
        assert_eq!(result.verdicts[0].subnet_name, "snet-busy");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_ambiguous_default_routes_recorded_but_classified() {
        let mut snet = subnet("snet-udr-both");
        let table = route_table(
            "rt-both",
            &[NextHopType::Internet, NextHopType::VirtualAppliance],
        );
        snet.route_table_id = Some(table.id.clone());
        let nic = vm_nic("nic-udr", &mut snet, false);
        let topology = topology(vec![snet], vec![table], vec![nic], vec![]);

        let result = classify(&topology, PolicyVersion::Refined);
        assert_eq!(result.verdicts.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0].error,
            EvaluationError::AmbiguousDefaultRoutes { .. }
        ));
    }

    #[test]
    fn test_unresolved_backend_member_reported_without_subnet() {
        let mut snet = subnet("snet-lb");
        let nic = vm_nic("nic-lb", &mut snet, false);
        let balancer = standard_lb("lb-out", vec!["member-gone".to_string()], true);
        let topology = topology(vec![snet], vec![], vec![nic], vec![balancer]);

        let result = classify(&topology, PolicyVersion::Refined);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].subnet_id, None);
        assert!(matches!(
            result.errors[0].error,
            EvaluationError::UnresolvableReference {
                kind: ReferenceKind::BackendPoolMember,
                ..
            }
        ));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut snet = subnet("snet-udr-inet");
        let table = route_table("rt-inet", &[NextHopType::Internet]);
        snet.route_table_id = Some(table.id.clone());
        let nic = vm_nic("nic-udr", &mut snet, false);
        let topology = topology(vec![snet], vec![table], vec![nic], vec![]);

        let first = classify(&topology, PolicyVersion::Legacy);
        let second = classify(&topology, PolicyVersion::Legacy);
        assert_eq!(first, second);
    }
}
