//! Azure Resource Graph snapshot collection.
//!
//! One bounded query per resource type; the raw provider rows are
//! translated into the provider-agnostic topology models here, so
//! nothing past this module knows about Azure's JSON shapes.

use super::cli;
use crate::config;
use crate::models::{
    BackendAddressPool, IpConfiguration, LbSku, LoadBalancer, NetworkInterface, OutboundRule,
    Route, RouteTable, Subnet, VirtualNetwork,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;

const VNET_QUERY: &str = r#"resources
        | where type == "microsoft.network/virtualnetworks"
        | project id, name, resource_group=resourceGroup, location,
                subnets=properties.subnets
        | sort by name asc"#;

const ROUTE_TABLE_QUERY: &str = r#"resources
        | where type == "microsoft.network/routetables"
        | project id, name, routes=properties.routes
        | sort by name asc"#;

const NIC_QUERY: &str = r#"resources
        | where type == "microsoft.network/networkinterfaces"
        | project id, virtual_machine_id=properties.virtualMachine.id,
                ip_configurations=properties.ipConfigurations
        | sort by id asc"#;

const LB_QUERY: &str = r#"resources
        | where type == "microsoft.network/loadbalancers"
        | project id, name, location, sku=sku.name,
                backend_pools=properties.backendAddressPools,
                outbound_rules=properties.outboundRules
        | sort by name asc"#;

/// Everything one scan run collected: the virtual networks under audit
/// plus the network resources their subnets reference.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Snapshot {
    /// Collection timestamp (RFC 3339), absent in hand-built fixtures.
    pub collected_at: Option<String>,
    pub virtual_networks: Vec<VirtualNetwork>,
    pub route_tables: Vec<RouteTable>,
    pub network_interfaces: Vec<NetworkInterface>,
    pub load_balancers: Vec<LoadBalancer>,
}

impl Snapshot {
    /// Total resources held, for progress logging.
    pub fn resource_count(&self) -> usize {
        self.virtual_networks.len()
            + self.route_tables.len()
            + self.network_interfaces.len()
            + self.load_balancers.len()
    }
}

/// One page of `az graph query --output json`.
#[derive(Deserialize, Debug)]
struct GraphPage<T> {
    data: Vec<T>,
    count: i64,
    total_records: Option<i64>,
}

/// Run one Resource Graph query and deserialize its rows.
fn query<T: DeserializeOwned>(kql: &str) -> Result<Vec<T>, Box<dyn Error>> {
    let cmd = format!(
        "az graph query --first {page_size} -q '{kql}' --output json",
        page_size = config::GRAPH_PAGE_SIZE
    );
    let output = cli::run(&cmd)?;

    let mut deserializer = serde_json::Deserializer::from_str(&output);
    let page: GraphPage<T> =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            format!(
                "Error parsing az graph output: path={path} error={e}",
                path = e.path()
            )
        })?;

    if let Some(total) = page.total_records {
        if total > page.count {
            // Pagination is out of scope; a tenant this size needs a
            // larger GRAPH_PAGE_SIZE.
            return Err(format!(
                "Graph query returned {count} of {total} records; raise GRAPH_PAGE_SIZE",
                count = page.count
            )
            .into());
        }
    }

    Ok(page.data)
}

/// Collect a full topology snapshot via `az graph query`.
pub fn run_az_graph_snapshot() -> Result<Snapshot, Box<dyn Error>> {
    let vnet_rows: Vec<RawVnetRow> = query(VNET_QUERY)?;
    let route_table_rows: Vec<RawRouteTableRow> = query(ROUTE_TABLE_QUERY)?;
    let nic_rows: Vec<RawNicRow> = query(NIC_QUERY)?;
    let lb_rows: Vec<RawLbRow> = query(LB_QUERY)?;

    let snapshot = Snapshot {
        collected_at: Some(chrono::Utc::now().to_rfc3339()),
        virtual_networks: vnet_rows.into_iter().map(RawVnetRow::into_model).collect(),
        route_tables: route_table_rows
            .into_iter()
            .map(RawRouteTableRow::into_model)
            .collect(),
        network_interfaces: nic_rows.into_iter().map(RawNicRow::into_model).collect(),
        load_balancers: lb_rows.into_iter().map(RawLbRow::into_model).collect(),
    };

    log::info!(
        "Collected snapshot: {vnets} vnets, {rts} route tables, {nics} NICs, {lbs} load balancers",
        vnets = snapshot.virtual_networks.len(),
        rts = snapshot.route_tables.len(),
        nics = snapshot.network_interfaces.len(),
        lbs = snapshot.load_balancers.len(),
    );

    Ok(snapshot)
}

/// Bare `{ "id": ... }` reference as Azure embeds them.
#[derive(Deserialize, Debug)]
struct RawRef {
    id: String,
}

#[derive(Deserialize, Debug)]
struct RawVnetRow {
    id: String,
    name: String,
    resource_group: String,
    location: String,
    #[serde(default)]
    subnets: Vec<RawSubnet>,
}

#[derive(Deserialize, Debug)]
struct RawSubnet {
    id: String,
    name: String,
    #[serde(default)]
    properties: RawSubnetProperties,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawSubnetProperties {
    address_prefix: Option<String>,
    address_prefixes: Option<Vec<String>>,
    route_table: Option<RawRef>,
    nat_gateway: Option<RawRef>,
    #[serde(default)]
    ip_configurations: Vec<RawRef>,
    // Only surfaced by newer API versions.
    default_outbound_access: Option<bool>,
}

impl RawVnetRow {
    fn into_model(self) -> VirtualNetwork {
        VirtualNetwork {
            id: self.id,
            name: self.name,
            resource_group: self.resource_group,
            location: self.location,
            subnets: self
                .subnets
                .into_iter()
                .map(|s| {
                    let p = s.properties;
                    Subnet {
                        id: s.id,
                        name: s.name,
                        address_prefixes: p
                            .address_prefixes
                            .or_else(|| p.address_prefix.map(|one| vec![one]))
                            .unwrap_or_default(),
                        route_table_id: p.route_table.map(|r| r.id),
                        nat_gateway_id: p.nat_gateway.map(|r| r.id),
                        ip_configuration_ids: p
                            .ip_configurations
                            .into_iter()
                            .map(|r| r.id)
                            .collect(),
                        default_outbound_access: p.default_outbound_access,
                    }
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct RawRouteTableRow {
    id: String,
    name: String,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Deserialize, Debug)]
struct RawRoute {
    name: String,
    properties: RawRouteProperties,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawRouteProperties {
    address_prefix: String,
    next_hop_type: crate::models::NextHopType,
}

impl RawRouteTableRow {
    fn into_model(self) -> RouteTable {
        RouteTable {
            id: self.id,
            name: self.name,
            routes: self
                .routes
                .into_iter()
                .map(|r| Route {
                    name: r.name,
                    address_prefix: r.properties.address_prefix,
                    next_hop_type: r.properties.next_hop_type,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct RawNicRow {
    id: String,
    virtual_machine_id: Option<String>,
    #[serde(default)]
    ip_configurations: Vec<RawIpConfiguration>,
}

#[derive(Deserialize, Debug)]
struct RawIpConfiguration {
    id: String,
    #[serde(default)]
    properties: RawIpConfigurationProperties,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawIpConfigurationProperties {
    subnet: Option<RawRef>,
    #[serde(rename = "publicIPAddress")]
    public_ip_address: Option<RawRef>,
}

impl RawNicRow {
    fn into_model(self) -> NetworkInterface {
        NetworkInterface {
            id: self.id,
            virtual_machine_id: self.virtual_machine_id,
            ip_configurations: self
                .ip_configurations
                .into_iter()
                .map(|c| IpConfiguration {
                    id: c.id,
                    subnet_id: c.properties.subnet.map(|r| r.id),
                    public_ip_id: c.properties.public_ip_address.map(|r| r.id),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct RawLbRow {
    id: String,
    name: String,
    location: String,
    sku: LbSku,
    #[serde(default)]
    backend_pools: Vec<RawBackendPool>,
    #[serde(default)]
    outbound_rules: Vec<RawOutboundRule>,
}

#[derive(Deserialize, Debug)]
struct RawBackendPool {
    id: String,
    #[serde(default)]
    properties: RawBackendPoolProperties,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawBackendPoolProperties {
    #[serde(rename = "backendIPConfigurations", default)]
    backend_ip_configurations: Vec<RawRef>,
}

#[derive(Deserialize, Debug)]
struct RawOutboundRule {
    name: String,
    properties: RawOutboundRuleProperties,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawOutboundRuleProperties {
    backend_address_pool: RawRef,
}

impl RawLbRow {
    fn into_model(self) -> LoadBalancer {
        LoadBalancer {
            id: self.id,
            name: self.name,
            location: self.location,
            sku: self.sku,
            backend_pools: self
                .backend_pools
                .into_iter()
                .map(|p| BackendAddressPool {
                    id: p.id,
                    backend_ip_configuration_ids: p
                        .properties
                        .backend_ip_configurations
                        .into_iter()
                        .map(|r| r.id)
                        .collect(),
                })
                .collect(),
            outbound_rules: self
                .outbound_rules
                .into_iter()
                .map(|r| OutboundRule {
                    name: r.name,
                    backend_pool_id: r.properties.backend_address_pool.id,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NextHopType;

    #[test]
    fn test_parse_vnet_row_with_subnet_properties() {
        let json = r#"{
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet-1",
            "name": "vnet-1",
            "resource_group": "rg",
            "location": "westeurope",
            "subnets": [{
                "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet-1/subnets/snet-1",
                "name": "snet-1",
                "properties": {
                    "addressPrefix": "10.0.1.0/24",
                    "routeTable": {"id": "rt-1"},
                    "ipConfigurations": [{"id": "ipcfg-1"}],
                    "defaultOutboundAccess": false
                }
            }]
        }"#;
        let row: RawVnetRow = serde_json::from_str(json).expect("Error parsing vnet row");
        let vnet = row.into_model();
        assert_eq!(vnet.subnets.len(), 1);
        let subnet = &vnet.subnets[0];
        assert_eq!(subnet.address_prefixes, vec!["10.0.1.0/24"]);
        assert_eq!(subnet.route_table_id.as_deref(), Some("rt-1"));
        assert_eq!(subnet.nat_gateway_id, None);
        assert_eq!(subnet.ip_configuration_ids, vec!["ipcfg-1"]);
        assert_eq!(subnet.default_outbound_access, Some(false));
    }

    #[test]
    fn test_parse_route_table_row() {
        let json = r#"{
            "id": "rt-1",
            "name": "rt-1",
            "routes": [{
                "name": "to-firewall",
                "properties": {"addressPrefix": "0.0.0.0/0", "nextHopType": "VirtualAppliance"}
            }]
        }"#;
        let row: RawRouteTableRow = serde_json::from_str(json).expect("Error parsing route table");
        let table = row.into_model();
        assert_eq!(table.routes[0].next_hop_type, NextHopType::VirtualAppliance);
        assert!(table.routes[0].is_default_route());
    }

    #[test]
    fn test_parse_lb_row() {
        let json = r#"{
            "id": "lb-1",
            "name": "lb-1",
            "location": "westeurope",
            "sku": "Standard",
            "backend_pools": [{
                "id": "pool-1",
                "properties": {"backendIPConfigurations": [{"id": "ipcfg-1"}]}
            }],
            "outbound_rules": [{
                "name": "outbound-all",
                "properties": {"backendAddressPool": {"id": "pool-1"}}
            }]
        }"#;
        let row: RawLbRow = serde_json::from_str(json).expect("Error parsing lb row");
        let lb = row.into_model();
        assert_eq!(lb.sku, LbSku::Standard);
        assert_eq!(lb.backend_pools[0].backend_ip_configuration_ids, vec!["ipcfg-1"]);
        assert_eq!(lb.outbound_rules[0].backend_pool_id, "pool-1");
    }

    #[test]
    fn test_parse_nic_row_without_vm() {
        let json = r#"{
            "id": "nic-1",
            "virtual_machine_id": null,
            "ip_configurations": [{
                "id": "nic-1/ipConfigurations/ipconfig1",
                "properties": {"subnet": {"id": "snet-1"}}
            }]
        }"#;
        let row: RawNicRow = serde_json::from_str(json).expect("Error parsing nic row");
        let nic = row.into_model();
        assert!(!nic.is_vm_attached());
        assert_eq!(
            nic.ip_configurations[0].subnet_id.as_deref(),
            Some("snet-1")
        );
        assert_eq!(nic.ip_configurations[0].public_ip_id, None);
    }
}
