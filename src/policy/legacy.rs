//! v1 rule set: VNet-granularity NAT/LB presence.
//!
//! Kept verbatim for comparison runs, imprecisions included: a NAT
//! gateway on a *sibling* subnet exempts this subnet, any load balancer
//! backend membership anywhere in the VNet counts as egress without
//! looking at outbound rules, and the UDR check does not distinguish
//! next-hop types. The v2.2 rule set fixes all three; this one must not.

use super::{default_route_next_hops, EgressPolicy, EvaluationError, Outcome, PolicyVersion, Verdict};
use crate::models::{Subnet, TopologyModel};

pub const REASON_NO_EGRESS: &str = "no egress";
pub const REASON_RISKY_UDR: &str = "risky UDR";

/// The v1 heuristic.
pub struct LegacyPolicy;

impl EgressPolicy for LegacyPolicy {
    fn version(&self) -> PolicyVersion {
        PolicyVersion::Legacy
    }

    fn evaluate(
        &self,
        subnet: &Subnet,
        topology: &TopologyModel,
    ) -> Result<Verdict, EvaluationError> {
        let mut verdict = Verdict::new(self.version(), topology, subnet);

        let vm_nics = topology.vm_attached_nics(subnet);
        verdict.has_vm_attached_nic = !vm_nics.is_empty();
        if vm_nics.is_empty() {
            verdict.outcome = Outcome::NotApplicable;
            return Ok(verdict);
        }

        let next_hops = default_route_next_hops(subnet, topology)?;
        verdict.has_udr = subnet.route_table_id.is_some();
        verdict.has_internet_default_route = next_hops
            .iter()
            .any(|h| *h == crate::models::NextHopType::Internet);
        verdict.has_appliance_or_gateway_default_route =
            next_hops.iter().any(|h| h.is_appliance_or_gateway());

        // v1 looked no further than "does the VNet have one anywhere".
        let vnet_has_nat_gateway = topology
            .vnet
            .subnets
            .iter()
            .any(|s| s.nat_gateway_id.is_some());
        let vnet_has_lb_membership = topology.load_balancers.iter().any(|lb| {
            lb.backend_pools.iter().any(|pool| {
                pool.backend_ip_configuration_ids.iter().any(|member| {
                    topology
                        .subnet_of_ip_configuration(member)
                        .is_some_and(|subnet_id| topology.contains_subnet(&subnet_id))
                })
            })
        });
        verdict.has_nat_gateway = vnet_has_nat_gateway;
        // v1 never inspected outbound rules; membership itself counted.
        verdict.has_lb_outbound_rule = vnet_has_lb_membership;

        if subnet.route_table_id.is_none() && !vnet_has_nat_gateway && !vnet_has_lb_membership {
            verdict.flag(REASON_NO_EGRESS);
        } else if subnet.route_table_id.is_some() && !next_hops.is_empty() {
            // Any 0.0.0.0/0 route counts, whatever its next hop.
            verdict.flag(REASON_RISKY_UDR);
        }

        verdict.default_route_next_hops = next_hops;
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::models::{LbSku, NextHopType};

    fn evaluate(subnet: &Subnet, topology: &TopologyModel) -> Verdict {
        LegacyPolicy
            .evaluate(subnet, topology)
            .expect("Error evaluating legacy policy")
    }

    #[test]
    fn test_not_applicable_without_vm_nic() {
        let snet = subnet("snet-empty");
        let topology = topology(vec![snet.clone()], vec![], vec![], vec![]);
        let verdict = evaluate(&snet, &topology);
        assert_eq!(verdict.outcome, Outcome::NotApplicable);
        assert!(!verdict.has_vm_attached_nic);
    }

    #[test]
    fn test_bare_subnet_is_flagged_no_egress() {
        let mut snet = subnet("snet-bare");
        let nic = vm_nic("nic-bare", &mut snet, false);
        let topology = topology(vec![snet.clone()], vec![], vec![nic], vec![]);
        let verdict = evaluate(&snet, &topology);
        assert_eq!(verdict.outcome, Outcome::Flagged);
        assert_eq!(verdict.reason.as_deref(), Some(REASON_NO_EGRESS));
    }

    #[test]
    fn test_sibling_nat_gateway_exempts_subnet() {
        // The v1 imprecision the v2.2 policy exists to fix.
        let mut snet = subnet("snet-bare");
        let nic = vm_nic("nic-bare", &mut snet, false);
        let mut sibling = subnet("snet-natgw");
        sibling.nat_gateway_id = Some(format!(
            "{SUB}/resourceGroups/rg-lab/providers/Microsoft.Network/natGateways/natgw-1"
        ));
        let topology = topology(vec![snet.clone(), sibling], vec![], vec![nic], vec![]);
        let verdict = evaluate(&snet, &topology);
        assert_eq!(verdict.outcome, Outcome::NotFlagged);
    }

    #[test]
    fn test_basic_lb_membership_counts_at_vnet_level() {
        let mut snet = subnet("snet-lb");
        let nic = vm_nic("nic-lb", &mut snet, false);
        let balancer = lb(
            "lb-basic",
            LbSku::Basic,
            vec![nic.ip_configurations[0].id.clone()],
            false,
        );
        let topology = topology(vec![snet.clone()], vec![], vec![nic], vec![balancer]);
        let verdict = evaluate(&snet, &topology);
        assert_eq!(verdict.outcome, Outcome::NotFlagged);
    }

    #[test]
    fn test_any_default_route_is_risky_udr() {
        // Next-hop blind: even a VnetLocal default route flags.
        let mut snet = subnet("snet-udr");
        let nic = vm_nic("nic-udr", &mut snet, false);
        let table = route_table("rt-local", &[NextHopType::VnetLocal]);
        snet.route_table_id = Some(table.id.clone());
        let topology = topology(vec![snet.clone()], vec![table], vec![nic], vec![]);
        let verdict = evaluate(&snet, &topology);
        assert_eq!(verdict.outcome, Outcome::Flagged);
        assert_eq!(verdict.reason.as_deref(), Some(REASON_RISKY_UDR));
    }

    #[test]
    fn test_route_table_without_default_route_not_flagged() {
        let mut snet = subnet("snet-udr");
        let nic = vm_nic("nic-udr", &mut snet, false);
        let table = route_table("rt-empty", &[]);
        snet.route_table_id = Some(table.id.clone());
        let topology = topology(vec![snet.clone()], vec![table], vec![nic], vec![]);
        let verdict = evaluate(&snet, &topology);
        // Route table assigned, so the "no egress" rule does not apply.
        assert_eq!(verdict.outcome, Outcome::NotFlagged);
    }

    #[test]
    fn test_unresolvable_route_table_is_an_error() {
        let mut snet = subnet("snet-broken");
        let nic = vm_nic("nic-broken", &mut snet, false);
        snet.route_table_id = Some("rt-not-in-snapshot".to_string());
        let topology = topology(vec![snet.clone()], vec![], vec![nic], vec![]);
        let err = LegacyPolicy
            .evaluate(&snet, &topology)
            .expect_err("Expected unresolvable reference");
        assert!(matches!(err, EvaluationError::UnresolvableReference { .. }));
    }
}
