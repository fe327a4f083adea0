//! Route table and route data model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The address prefix that makes a route a default route.
pub const DEFAULT_ROUTE_PREFIX: &str = "0.0.0.0/0";

/// Where a route sends matching traffic.
///
/// `Other` absorbs next-hop types this tool does not reason about
/// (newer API versions add values without notice).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextHopType {
    Internet,
    VirtualAppliance,
    VirtualNetworkGateway,
    VnetLocal,
    None,
    #[serde(other)]
    Other,
}

impl NextHopType {
    /// True for the next-hop types that count as an explicit operator
    /// egress path (traffic is steered through an appliance or gateway).
    pub fn is_appliance_or_gateway(&self) -> bool {
        matches!(
            self,
            NextHopType::VirtualAppliance | NextHopType::VirtualNetworkGateway
        )
    }
}

impl fmt::Display for NextHopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NextHopType::Internet => "Internet",
            NextHopType::VirtualAppliance => "VirtualAppliance",
            NextHopType::VirtualNetworkGateway => "VirtualNetworkGateway",
            NextHopType::VnetLocal => "VnetLocal",
            NextHopType::None => "None",
            NextHopType::Other => "Other",
        };
        write!(f, "{s}")
    }
}

/// A single user defined route.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Route name within its table.
    pub name: String,
    /// CIDR the route matches.
    pub address_prefix: String,
    /// Where matching traffic goes.
    pub next_hop_type: NextHopType,
}

impl Route {
    /// True when this route matches all traffic (`0.0.0.0/0`).
    pub fn is_default_route(&self) -> bool {
        self.address_prefix.trim() == DEFAULT_ROUTE_PREFIX
    }
}

/// A route table and its routes, as associated to subnets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    /// Fully-qualified resource id.
    pub id: String,
    /// Route table name.
    pub name: String,
    /// Routes in provider order.
    pub routes: Vec<Route>,
}

impl RouteTable {
    /// Next-hop types of all default routes in this table, in route order.
    ///
    /// A table has at most one default route in practice, but the model
    /// does not assume it; conflicting entries are surfaced to the caller.
    pub fn default_route_next_hops(&self) -> Vec<NextHopType> {
        self.routes
            .iter()
            .filter(|r| r.is_default_route())
            .map(|r| r.next_hop_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix: &str, next_hop_type: NextHopType) -> Route {
        Route {
            name: "r".to_string(),
            address_prefix: prefix.to_string(),
            next_hop_type,
        }
    }

    #[test]
    fn test_is_default_route() {
        assert!(route("0.0.0.0/0", NextHopType::Internet).is_default_route());
        assert!(!route("10.0.0.0/8", NextHopType::Internet).is_default_route());
    }

    #[test]
    fn test_default_route_next_hops_keeps_order_and_duplicates() {
        let table = RouteTable {
            id: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/routeTables/rt"
                .to_string(),
            name: "rt".to_string(),
            routes: vec![
                route("10.0.0.0/8", NextHopType::VnetLocal),
                route("0.0.0.0/0", NextHopType::Internet),
                route("0.0.0.0/0", NextHopType::VirtualAppliance),
            ],
        };
        assert_eq!(
            table.default_route_next_hops(),
            vec![NextHopType::Internet, NextHopType::VirtualAppliance]
        );
    }

    #[test]
    fn test_next_hop_type_other_from_unknown_string() {
        let parsed: NextHopType =
            serde_json::from_str(r#""SomeFutureHopType""#).expect("Error parsing next hop");
        assert_eq!(parsed, NextHopType::Other);
    }
}
