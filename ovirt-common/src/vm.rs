///! Virtual machine resource types

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::host::CpuTopology;
use crate::Link;

/// Response of `GET vms`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vms {
    #[serde(rename = "vm", default)]
    pub vms: Vec<Vm>,
}

/// Virtual machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vm {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Only present while the VM is placed on a host
    #[serde(default)]
    pub host: Option<Link>,
    #[serde(default)]
    pub cluster: Option<Link>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu: VmCpu,
    #[serde(default)]
    pub has_illegal_images: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmCpu {
    #[serde(default)]
    pub topology: CpuTopology,
}

impl Vm {
    pub fn host_id(&self) -> &str {
        self.host.as_ref().map(|h| h.id.as_str()).unwrap_or_default()
    }

    pub fn cluster_id(&self) -> &str {
        self.cluster.as_ref().map(|c| c.id.as_str()).unwrap_or_default()
    }
}

/// Response of `GET vms/{id}/snapshots`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshots {
    #[serde(rename = "snapshot", default)]
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub persist_memorystate: bool,
    #[serde(default)]
    pub snapshot_status: String,
    #[serde(default)]
    pub snapshot_type: String,
}

/// Response of `GET vms/{id}/diskattachments`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskAttachments {
    #[serde(rename = "disk_attachment", default)]
    pub attachments: Vec<DiskAttachment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskAttachment {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub logical_name: String,
    #[serde(default)]
    pub disk: Link,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_xml;

    #[test]
    fn test_decode_vms() {
        let xml = r#"<vms>
            <vm href="/ovirt-engine/api/vms/v1" id="v1">
                <name>web-01</name>
                <cpu>
                    <architecture>x86_64</architecture>
                    <topology><cores>2</cores><sockets>1</sockets><threads>1</threads></topology>
                </cpu>
                <has_illegal_images>true</has_illegal_images>
                <status>up</status>
                <cluster href="/ovirt-engine/api/clusters/c1" id="c1"/>
                <host href="/ovirt-engine/api/hosts/h1" id="h1"/>
            </vm>
            <vm href="/ovirt-engine/api/vms/v2" id="v2">
                <name>db-01</name>
                <status>down</status>
                <cluster href="/ovirt-engine/api/clusters/c1" id="c1"/>
            </vm>
        </vms>"#;

        let vms: Vms = from_xml(xml).unwrap();
        assert_eq!(vms.vms.len(), 2);
        assert_eq!(vms.vms[0].host_id(), "h1");
        assert_eq!(vms.vms[0].cpu.topology.cores, 2);
        assert!(vms.vms[0].has_illegal_images);
        assert_eq!(vms.vms[1].host_id(), "");
        assert_eq!(vms.vms[1].cluster_id(), "c1");
        assert!(!vms.vms[1].has_illegal_images);
    }

    #[test]
    fn test_decode_snapshots() {
        let xml = r#"<snapshots>
            <snapshot id="s0">
                <description>Active VM</description>
                <date>2024-01-01T10:00:00.000+01:00</date>
                <snapshot_type>active</snapshot_type>
            </snapshot>
            <snapshot id="s1">
                <description>before upgrade</description>
                <date>2024-02-01T10:00:00.000+01:00</date>
                <persist_memorystate>false</persist_memorystate>
                <snapshot_status>ok</snapshot_status>
                <snapshot_type>regular</snapshot_type>
            </snapshot>
        </snapshots>"#;

        let snaps: Snapshots = from_xml(xml).unwrap();
        assert_eq!(snaps.snapshots.len(), 2);
        assert_eq!(snaps.snapshots[1].snapshot_type, "regular");

        let date = snaps.snapshots[1].date.unwrap();
        assert_eq!(date.to_rfc3339(), "2024-02-01T10:00:00+01:00");
    }

    #[test]
    fn test_decode_disk_attachments() {
        let xml = r#"<disk_attachments>
            <disk_attachment id="d1">
                <bootable>true</bootable>
                <logical_name>/dev/vda</logical_name>
                <disk href="/ovirt-engine/api/disks/d1" id="d1"/>
                <vm href="/ovirt-engine/api/vms/v1" id="v1"/>
            </disk_attachment>
        </disk_attachments>"#;

        let attachments: DiskAttachments = from_xml(xml).unwrap();
        assert_eq!(attachments.attachments.len(), 1);
        assert_eq!(attachments.attachments[0].logical_name, "/dev/vda");
        assert_eq!(attachments.attachments[0].disk.id, "d1");
    }
}
