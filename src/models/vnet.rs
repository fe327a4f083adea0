//! Azure Virtual Network (VNet) data model.

use super::Subnet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A virtual network and its subnets, immutable once collected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VirtualNetwork {
    /// Fully-qualified resource id.
    pub id: String,
    /// Name of the virtual network.
    pub name: String,
    /// Resource group containing the VNet.
    pub resource_group: String,
    /// Azure region location.
    pub location: String,
    /// Subnets in provider order.
    pub subnets: Vec<Subnet>,
}

impl fmt::Display for VirtualNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} subnets, {}, rg: {})",
            self.name,
            self.subnets.len(),
            self.location,
            self.resource_group
        )
    }
}
