//! Versioned egress classification policies.
//!
//! The detection heuristic evolved in the field, and old and new rule sets
//! stay selectable side by side for audit comparison:
//! - [`LegacyPolicy`] - v1, coarse VNet-level NAT/LB presence
//! - [`RefinedPolicy`] - v2.2, subnet/NIC-level resolution
//!
//! A policy is a pure function over `(Subnet, TopologyModel)`: no I/O, no
//! mutation, and any unresolvable reference degrades to an error instead of
//! being read as "no egress configured".

mod legacy;
mod refined;

pub use legacy::{LegacyPolicy, REASON_NO_EGRESS, REASON_RISKY_UDR};
pub use refined::{RefinedPolicy, REASON_NO_EXPLICIT_EGRESS, REASON_RISKY_UDR_INTERNET};

use crate::models::{NextHopType, Subnet, TopologyModel};
use itertools::Itertools;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Selector for a named rule-set version.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVersion {
    /// v1 heuristic: VNet-granularity NAT/LB, next-hop-blind UDR check.
    Legacy,
    /// v2.2 heuristic: subnet/NIC granularity, next-hop aware.
    Refined,
}

impl PolicyVersion {
    /// The policy implementation for this version.
    pub fn policy(&self) -> &'static dyn EgressPolicy {
        match self {
            PolicyVersion::Legacy => &LegacyPolicy,
            PolicyVersion::Refined => &RefinedPolicy,
        }
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyVersion::Legacy => write!(f, "v1-legacy"),
            PolicyVersion::Refined => write!(f, "v2.2-refined"),
        }
    }
}

impl FromStr for PolicyVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "v1" | "v1-legacy" => Ok(PolicyVersion::Legacy),
            "refined" | "v2" | "v2.2" | "v2.2-refined" => Ok(PolicyVersion::Refined),
            other => Err(format!("unknown policy '{other}' (expected legacy or refined)")),
        }
    }
}

/// Per-subnet classification outcome.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No VM-attached NIC; the deprecation does not affect this subnet.
    NotApplicable,
    /// Relies on implicit default outbound access, or routes it riskily.
    Flagged,
    /// Has an explicit egress path.
    NotFlagged,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::NotApplicable => "NotApplicable",
            Outcome::Flagged => "Flagged",
            Outcome::NotFlagged => "NotFlagged",
        };
        write!(f, "{s}")
    }
}

/// The engine's per-subnet result: classification outcome plus the
/// evidence flags it was derived from.
///
/// Recomputing a verdict from an unchanged topology is deterministic,
/// down to the reason string.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Id of the VNet containing the subnet.
    pub vnet_id: String,
    /// Name of the VNet containing the subnet.
    pub vnet_name: String,
    /// Subnet id.
    pub subnet_id: String,
    /// Subnet name.
    pub subnet_name: String,
    /// Rule-set version that produced this verdict.
    pub policy: PolicyVersion,
    /// A route table is assigned to the subnet.
    pub has_udr: bool,
    /// A `0.0.0.0/0` route points at Internet.
    pub has_internet_default_route: bool,
    /// A `0.0.0.0/0` route points at an appliance or gateway.
    pub has_appliance_or_gateway_default_route: bool,
    /// NAT gateway present (subnet-level for v2.2, VNet-level for v1).
    pub has_nat_gateway: bool,
    /// Covered by a load balancer outbound path (see policy docs for
    /// the granularity each version applies).
    pub has_lb_outbound_rule: bool,
    /// A VM-attached NIC in the subnet carries a public ip.
    pub has_nic_public_ip: bool,
    /// The subnet has at least one VM-attached NIC.
    pub has_vm_attached_nic: bool,
    /// Next-hop types of all `0.0.0.0/0` routes, in route order.
    pub default_route_next_hops: Vec<NextHopType>,
    /// Provider-reported `defaultOutboundAccess`, surfaced as-is.
    pub default_outbound_access: Option<bool>,
    /// Classification outcome.
    pub outcome: Outcome,
    /// Human-readable reason, set when flagged.
    pub reason: Option<String>,
}

impl Verdict {
    /// Start a verdict for `subnet` with all evidence flags cleared.
    pub fn new(policy: PolicyVersion, topology: &TopologyModel, subnet: &Subnet) -> Verdict {
        Verdict {
            vnet_id: topology.vnet.id.clone(),
            vnet_name: topology.vnet.name.clone(),
            subnet_id: subnet.id.clone(),
            subnet_name: subnet.name.clone(),
            policy,
            has_udr: false,
            has_internet_default_route: false,
            has_appliance_or_gateway_default_route: false,
            has_nat_gateway: false,
            has_lb_outbound_rule: false,
            has_nic_public_ip: false,
            has_vm_attached_nic: false,
            default_route_next_hops: Vec::new(),
            default_outbound_access: subnet.default_outbound_access,
            outcome: Outcome::NotFlagged,
            reason: None,
        }
    }

    fn flag(&mut self, reason: &str) {
        self.outcome = Outcome::Flagged;
        self.reason = Some(reason.to_string());
    }
}

/// What kind of reference failed to resolve in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    RouteTable,
    BackendPoolMember,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceKind::RouteTable => "route table",
            ReferenceKind::BackendPoolMember => "backend pool member",
        };
        write!(f, "{s}")
    }
}

/// A condition that degrades one subnet's evaluation. Never fatal to the
/// run; the engine records it and moves on to the next subnet.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// An id referenced by the subnet (or a load balancer pool) cannot be
    /// looked up in the supplied topology.
    UnresolvableReference { kind: ReferenceKind, id: String },
    /// More than one `0.0.0.0/0` route with conflicting next-hop types.
    /// Classification still proceeds with "any Internet present" /
    /// "any appliance-or-gateway present" semantics.
    AmbiguousDefaultRoutes { next_hop_types: Vec<NextHopType> },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::UnresolvableReference { kind, id } => {
                write!(f, "unresolvable {kind} reference: '{id}'")
            }
            EvaluationError::AmbiguousDefaultRoutes { next_hop_types } => {
                write!(
                    f,
                    "multiple 0.0.0.0/0 routes with conflicting next-hop types: {}",
                    next_hop_types.iter().map(|t| t.to_string()).join(", ")
                )
            }
        }
    }
}

impl Error for EvaluationError {}

/// A versioned egress classification rule set.
pub trait EgressPolicy: Sync {
    /// The version this implementation realizes.
    fn version(&self) -> PolicyVersion;

    /// Classify one subnet against the topology snapshot.
    ///
    /// Pure: same inputs give the same verdict, including the reason
    /// string. A missing route table reference is an error, never a
    /// silent "not flagged".
    fn evaluate(&self, subnet: &Subnet, topology: &TopologyModel)
        -> Result<Verdict, EvaluationError>;
}

/// Next-hop types of the subnet's `0.0.0.0/0` routes, in route order.
///
/// Empty when no route table is assigned or the table has no default
/// route. An assigned but unresolvable table is an error.
pub(crate) fn default_route_next_hops(
    subnet: &Subnet,
    topology: &TopologyModel,
) -> Result<Vec<NextHopType>, EvaluationError> {
    let Some(route_table_id) = subnet.route_table_id.as_deref() else {
        return Ok(Vec::new());
    };
    let route_table = topology.route_table(route_table_id).ok_or_else(|| {
        EvaluationError::UnresolvableReference {
            kind: ReferenceKind::RouteTable,
            id: route_table_id.to_string(),
        }
    })?;
    Ok(route_table.default_route_next_hops())
}
