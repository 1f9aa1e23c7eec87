///! Host resource types

use serde::{Deserialize, Serialize};

use crate::Link;

/// Response of `GET hosts`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hosts {
    #[serde(rename = "host", default)]
    pub hosts: Vec<Host>,
}

/// Hypervisor host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Host {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster: Option<Link>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu: HostCpu,
    /// Installed memory in bytes
    #[serde(default)]
    pub memory: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostCpu {
    /// Clock speed in MHz
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub topology: CpuTopology,
}

/// CPU layout shared by hosts and VMs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTopology {
    #[serde(default)]
    pub cores: u32,
    #[serde(default)]
    pub sockets: u32,
    #[serde(default)]
    pub threads: u32,
}

impl Host {
    pub fn cluster_id(&self) -> &str {
        self.cluster.as_ref().map(|c| c.id.as_str()).unwrap_or_default()
    }
}
