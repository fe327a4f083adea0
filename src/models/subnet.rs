//! Azure subnet data model.

use serde::{Deserialize, Serialize};

/// A subnet as captured in a topology snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    /// Fully-qualified resource id.
    pub id: String,
    /// Subnet name within its virtual network.
    pub name: String,
    /// CIDR blocks of the subnet.
    pub address_prefixes: Vec<String>,
    /// Id of the associated route table, if one is assigned.
    pub route_table_id: Option<String>,
    /// Id of the associated NAT gateway, if one is assigned.
    pub nat_gateway_id: Option<String>,
    /// Ids of NIC ip configurations placed in this subnet.
    pub ip_configuration_ids: Vec<String>,
    /// Provider-reported `defaultOutboundAccess` flag. Advisory only:
    /// not all API versions expose it, and it never overrides the
    /// computed classification.
    pub default_outbound_access: Option<bool>,
}
