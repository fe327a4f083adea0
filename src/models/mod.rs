//! Domain models for the egress audit.
//!
//! Provider-agnostic, pure-data representation of one virtual network's
//! topology, built by the collector and consumed by the policies:
//! - [`VirtualNetwork`] and [`Subnet`] - the network under audit
//! - [`NetworkInterface`] - VM attachment and public ip associations
//! - [`RouteTable`], [`Route`], [`NextHopType`] - user defined routing
//! - [`LoadBalancer`] and friends - outbound rule membership
//! - [`TopologyModel`] - the queryable per-VNet snapshot
//! - [`ResourceId`] - resource id grammar parsing

mod load_balancer;
mod network;
mod resource_id;
mod route;
mod subnet;
mod topology;
mod vnet;

// Re-export public types
pub use load_balancer::{BackendAddressPool, LbSku, LoadBalancer, OutboundRule};
pub use network::{IpConfiguration, NetworkInterface};
pub use resource_id::{normalize_id, ResourceId, ResourceIdError};
pub use route::{NextHopType, Route, RouteTable, DEFAULT_ROUTE_PREFIX};
pub use subnet::Subnet;
pub use topology::TopologyModel;
pub use vnet::VirtualNetwork;
