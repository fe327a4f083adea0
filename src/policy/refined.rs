//! v2.2 rule set: subnet/NIC-granularity egress resolution.

use super::{default_route_next_hops, EgressPolicy, EvaluationError, Outcome, PolicyVersion, Verdict};
use crate::models::{normalize_id, LbSku, NextHopType, Subnet, TopologyModel};
use std::collections::HashSet;

pub const REASON_NO_EXPLICIT_EGRESS: &str = "no explicit egress";
pub const REASON_RISKY_UDR_INTERNET: &str = "risky UDR to Internet";

/// The v2.2 heuristic.
///
/// Explicit egress is any of: the subnet's own NAT gateway association, a
/// Standard load balancer outbound rule covering a pool this subnet is a
/// member of, a public ip on a VM-attached NIC, or a `0.0.0.0/0` route to
/// a virtual appliance or gateway. A default route to Internet alongside a
/// NAT gateway, outbound rule, or public ip is not flagged: the explicit
/// path wins.
pub struct RefinedPolicy;

impl RefinedPolicy {
    /// True when a Standard load balancer has an outbound rule for a
    /// backend pool with at least one member in `subnet`.
    ///
    /// Basic SKU balancers never qualify, and plain backend membership
    /// without an outbound rule is not an egress path.
    fn has_lb_outbound_rule(subnet: &Subnet, topology: &TopologyModel) -> bool {
        let subnet_key = normalize_id(&subnet.id);
        for lb in &topology.load_balancers {
            if lb.sku != LbSku::Standard {
                continue;
            }
            let member_pools: HashSet<String> = lb
                .backend_pools
                .iter()
                .filter(|pool| {
                    pool.backend_ip_configuration_ids.iter().any(|member| {
                        topology.subnet_of_ip_configuration(member).as_deref()
                            == Some(subnet_key.as_str())
                    })
                })
                .map(|pool| normalize_id(&pool.id))
                .collect();
            if member_pools.is_empty() {
                continue;
            }
            if lb
                .outbound_rules
                .iter()
                .any(|rule| member_pools.contains(&normalize_id(&rule.backend_pool_id)))
            {
                return true;
            }
        }
        false
    }
}

impl EgressPolicy for RefinedPolicy {
    fn version(&self) -> PolicyVersion {
        PolicyVersion::Refined
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

        verdict.has_nat_gateway = subnet.nat_gateway_id.is_some();
        verdict.has_nic_public_ip = vm_nics.iter().any(|nic| nic.has_public_ip());
        verdict.has_lb_outbound_rule = Self::has_lb_outbound_rule(subnet, topology);

        let next_hops = default_route_next_hops(subnet, topology)?;
        verdict.has_udr = subnet.route_table_id.is_some();
        verdict.has_internet_default_route =
            next_hops.iter().any(|h| *h == NextHopType::Internet);
        verdict.has_appliance_or_gateway_default_route =
            next_hops.iter().any(|h| h.is_appliance_or_gateway());
        verdict.default_route_next_hops = next_hops;

        let explicit_path = verdict.has_nat_gateway
            || verdict.has_lb_outbound_rule
            || verdict.has_nic_public_ip;
        let has_explicit_egress =
            explicit_path || verdict.has_appliance_or_gateway_default_route;

        if verdict.has_internet_default_route && !explicit_path {
            verdict.flag(REASON_RISKY_UDR_INTERNET);
        } else if !has_explicit_egress {
            verdict.flag(REASON_NO_EXPLICIT_EGRESS);
        }

        if let Some(advisory) = verdict.default_outbound_access {
            log::debug!(
                "subnet '{}': provider defaultOutboundAccess={advisory} (advisory, not used)",
                subnet.name
            );
        }

        Ok(verdict)
    }
}
