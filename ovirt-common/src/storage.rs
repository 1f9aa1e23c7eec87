///! Storage domain and disk resource types

use serde::{Deserialize, Serialize};

use crate::Link;

/// Response of `GET storagedomains`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageDomains {
    #[serde(rename = "storage_domain", default)]
    pub domains: Vec<StorageDomain>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageDomain {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Domain role: data, iso, export, ...
    #[serde(rename = "type", default)]
    pub domain_type: String,
    #[serde(default)]
    pub storage: StorageBacking,
    #[serde(default)]
    pub available: f64,
    #[serde(default)]
    pub used: f64,
    #[serde(default)]
    pub committed: f64,
    #[serde(default)]
    pub external_status: String,
    #[serde(default)]
    pub master: bool,
}

/// Where the domain lives (nfs, iscsi, fcp, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageBacking {
    #[serde(rename = "type", default)]
    pub storage_type: String,
    #[serde(default)]
    pub path: String,
}

/// Response of `GET disks/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Disk {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub provisioned_size: u64,
    #[serde(default)]
    pub actual_size: u64,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub storage_domains: DiskStorageDomains,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskStorageDomains {
    #[serde(rename = "storage_domain", default)]
    pub domains: Vec<Link>,
}

impl Disk {
    /// Id of the storage domain holding the disk, empty if the engine reports none
    pub fn storage_domain_id(&self) -> &str {
        self.storage_domains
            .domains
            .first()
            .map(|d| d.id.as_str())
            .unwrap_or_default()
    }
}
