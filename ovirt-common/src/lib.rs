//! Wire types shared by the oVirt exporter crates
//!
//! Every resource the engine API returns is modelled as an explicit struct that
//! is decoded from the XML representation. Fields the engine may omit are
//! `Option` or fall back to their default.

pub mod host;
pub mod network;
pub mod statistic;
pub mod storage;
pub mod vm;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use host::{Host, Hosts};
pub use network::{HostNics, Nic, VmNics};
pub use statistic::{Statistic, StatisticKind, Statistics};
pub use storage::{Disk, StorageDomain, StorageDomains};
pub use vm::{DiskAttachment, DiskAttachments, Snapshot, Snapshots, Vm, Vms};

/// Reference to another resource, e.g. `<cluster href="..." id="..."/>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "@id", default)]
    pub id: String,
}

/// Any resource reduced to its display name (hosts, clusters, storage domains)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to decode {resource}: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("Empty response body for {0}")]
    EmptyBody(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Decode an API response body into `T`
pub fn from_xml<T: DeserializeOwned>(body: &str) -> Result<T> {
    let resource = short_type_name::<T>();

    if body.trim().is_empty() {
        return Err(Error::EmptyBody(resource));
    }

    quick_xml::de::from_str(body).map_err(|source| Error::Decode { resource, source })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
