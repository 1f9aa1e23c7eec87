///! Network interface resource types

use serde::{Deserialize, Serialize};

/// Response of `GET hosts/{id}/nics`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostNics {
    #[serde(rename = "host_nic", default)]
    pub nics: Vec<Nic>,
}

/// Response of `GET vms/{id}/nics`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmNics {
    #[serde(rename = "nic", default)]
    pub nics: Vec<Nic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nic {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mac: Mac,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mac {
    #[serde(default)]
    pub address: String,
}

impl From<HostNics> for Vec<Nic> {
    fn from(nics: HostNics) -> Self {
        nics.nics
    }
}

impl From<VmNics> for Vec<Nic> {
    fn from(nics: VmNics) -> Self {
        nics.nics
    }
}
