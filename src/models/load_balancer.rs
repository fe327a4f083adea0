//! Load balancer data model.

use serde::{Deserialize, Serialize};

/// Load balancer SKU tier. Only Standard supports outbound rules.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LbSku {
    Basic,
    Standard,
}

/// A backend address pool and the NIC ip-configurations it contains.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BackendAddressPool {
    /// Fully-qualified resource id.
    pub id: String,
    /// Member NIC ip-configuration ids.
    pub backend_ip_configuration_ids: Vec<String>,
}

/// An outbound rule granting a backend pool an explicit SNAT path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutboundRule {
    /// Rule name within the load balancer.
    pub name: String,
    /// Id of the single backend pool this rule covers.
    pub backend_pool_id: String,
}

/// A load balancer with its pools and outbound rules.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    /// Fully-qualified resource id.
    pub id: String,
    /// Load balancer name.
    pub name: String,
    /// Azure region location.
    pub location: String,
    /// SKU tier.
    pub sku: LbSku,
    /// Backend address pools.
    pub backend_pools: Vec<BackendAddressPool>,
    /// Outbound rules (Standard SKU only; empty on Basic).
    pub outbound_rules: Vec<OutboundRule>,
}
