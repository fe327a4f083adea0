//! Topology snapshot for one virtual network.
//!
//! Read-only view built once per VNet per scan run. All id lookups are
//! case-insensitive because Azure does not keep resource id casing stable
//! across API calls.

use super::resource_id::{normalize_id, ResourceId};
use super::{LoadBalancer, NetworkInterface, RouteTable, Subnet, VirtualNetwork};
use std::collections::{HashMap, HashSet};

/// Queryable, consistent snapshot of one VNet and the network resources
/// the classification policies need. Performs no I/O; construction from
/// live data is the collector's job.
#[derive(Debug, Clone)]
pub struct TopologyModel {
    /// The virtual network under audit.
    pub vnet: VirtualNetwork,
    /// Load balancers in the VNet's resource group and location.
    pub load_balancers: Vec<LoadBalancer>,
    route_tables: HashMap<String, RouteTable>,
    nics: HashMap<String, NetworkInterface>,
    nic_by_ip_configuration: HashMap<String, String>,
    subnet_ids: HashSet<String>,
}

impl TopologyModel {
    /// Build the topology view for one VNet.
    ///
    /// Route tables and NICs are indexed as given (lookups are by id, so
    /// entries for other VNets are harmless and keep cross-VNet backend
    /// pool members resolvable). Load balancers are scoped to the VNet's
    /// resource group and location, the granularity the v1 policy used.
    pub fn for_vnet(
        vnet: VirtualNetwork,
        route_tables: &[RouteTable],
        network_interfaces: &[NetworkInterface],
        load_balancers: &[LoadBalancer],
    ) -> TopologyModel {
        let route_tables = route_tables
            .iter()
            .map(|rt| (normalize_id(&rt.id), rt.clone()))
            .collect();

        let mut nics = HashMap::new();
        let mut nic_by_ip_configuration = HashMap::new();
        for nic in network_interfaces {
            let nic_key = normalize_id(&nic.id);
            for ip_configuration in &nic.ip_configurations {
                nic_by_ip_configuration
                    .insert(normalize_id(&ip_configuration.id), nic_key.clone());
            }
            nics.insert(nic_key, nic.clone());
        }

        let load_balancers = load_balancers
            .iter()
            .filter(|lb| match ResourceId::parse(&lb.id) {
                Ok(id) => {
                    id.in_resource_group(&vnet.resource_group)
                        && lb.location.eq_ignore_ascii_case(&vnet.location)
                }
                Err(e) => {
                    log::warn!("Skipping load balancer with unparsable id: {e}");
                    false
                }
            })
            .cloned()
            .collect();

        let subnet_ids = vnet.subnets.iter().map(|s| normalize_id(&s.id)).collect();

        TopologyModel {
            vnet,
            load_balancers,
            route_tables,
            nics,
            nic_by_ip_configuration,
            subnet_ids,
        }
    }

    /// Look up a route table by id.
    pub fn route_table(&self, id: &str) -> Option<&RouteTable> {
        self.route_tables.get(&normalize_id(id))
    }

    /// Look up a network interface by id.
    pub fn network_interface(&self, id: &str) -> Option<&NetworkInterface> {
        self.nics.get(&normalize_id(id))
    }

    /// Resolve an ip-configuration id to its owning network interface.
    pub fn nic_for_ip_configuration(&self, ip_configuration_id: &str) -> Option<&NetworkInterface> {
        let nic_key = self
            .nic_by_ip_configuration
            .get(&normalize_id(ip_configuration_id))?;
        self.nics.get(nic_key)
    }

    /// Resolve an ip-configuration id to the subnet it sits in.
    ///
    /// A NIC has exactly one subnet per ip configuration, so a backend
    /// pool member resolves to at most one subnet.
    pub fn subnet_of_ip_configuration(&self, ip_configuration_id: &str) -> Option<String> {
        let wanted = normalize_id(ip_configuration_id);
        let nic = self.nic_for_ip_configuration(ip_configuration_id)?;
        nic.ip_configurations
            .iter()
            .find(|c| normalize_id(&c.id) == wanted)
            .and_then(|c| c.subnet_id.as_deref())
            .map(normalize_id)
    }

    /// True when the given subnet id belongs to this VNet.
    pub fn contains_subnet(&self, subnet_id: &str) -> bool {
        self.subnet_ids.contains(&normalize_id(subnet_id))
    }

    /// VM-attached network interfaces with an ip configuration in `subnet`.
    ///
    /// Ip-configuration references that do not resolve to a NIC are skipped
    /// (private endpoints and similar occupants have ip configurations that
    /// are not network interfaces).
    pub fn vm_attached_nics(&self, subnet: &Subnet) -> Vec<&NetworkInterface> {
        let mut seen = HashSet::new();
        let mut attached = Vec::new();
        for ip_configuration_id in &subnet.ip_configuration_ids {
            let Some(nic) = self.nic_for_ip_configuration(ip_configuration_id) else {
                log::debug!(
                    "subnet '{}': ip configuration '{}' is not a NIC ip configuration",
                    subnet.name,
                    ip_configuration_id
                );
                continue;
            };
            if nic.is_vm_attached() && seen.insert(normalize_id(&nic.id)) {
                attached.push(nic);
            }
        }
        attached
    }

    /// Backend pool members that resolve to no NIC in the snapshot,
    /// as `(pool id, member id)` pairs.
    pub fn unresolved_backend_members(&self) -> Vec<(String, String)> {
        let mut unresolved = Vec::new();
        for lb in &self.load_balancers {
            for pool in &lb.backend_pools {
                for member in &pool.backend_ip_configuration_ids {
                    if self.nic_for_ip_configuration(member).is_none() {
                        unresolved.push((pool.id.clone(), member.clone()));
                    }
                }
            }
        }
        unresolved
    }
}
