//! Network interface data model.

use serde::{Deserialize, Serialize};

/// One ip configuration of a network interface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IpConfiguration {
    /// Fully-qualified resource id (child of the NIC id).
    pub id: String,
    /// Id of the subnet this configuration sits in.
    pub subnet_id: Option<String>,
    /// Id of the associated public ip address, if any.
    pub public_ip_id: Option<String>,
}

/// A network interface and its VM attachment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    /// Fully-qualified resource id.
    pub id: String,
    /// Owning virtual machine id. Present means "VM-attached".
    pub virtual_machine_id: Option<String>,
    /// Ip configurations in provider order.
    pub ip_configurations: Vec<IpConfiguration>,
}

impl NetworkInterface {
    /// True when the interface is attached to a virtual machine.
    pub fn is_vm_attached(&self) -> bool {
        self.virtual_machine_id.is_some()
    }

    /// True when any ip configuration carries a public ip address.
    pub fn has_public_ip(&self) -> bool {
        self.ip_configurations
            .iter()
            .any(|c| c.public_ip_id.is_some())
    }
}
