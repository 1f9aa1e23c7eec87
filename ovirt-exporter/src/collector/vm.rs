///! Virtual machine collector (`ovirt_vm_*`)
///!
///! Besides the base and statistic metrics, each VM can contribute network,
///! snapshot and disk metrics depending on the collector options.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ovirt_common::{Disk, DiskAttachment, DiskAttachments, Snapshot, Snapshots, Vm, Vms};
use prometheus::Histogram;
use tracing::{debug, error, info_span, Instrument};

use super::fanout::{self, Recorder};
use super::{network, statistic, Collector, CollectorContext, Memoized};
use crate::error::{ExporterError, Result};
use crate::metric::{self, Labels, MetricDesc, Observation};

const PREFIX: &str = "ovirt_vm_";
const LABEL_NAMES: [&str; 3] = ["name", "host", "cluster"];
const DISK_LABEL_NAMES: [&str; 7] = [
    "name",
    "host",
    "cluster",
    "disk_name",
    "disk_alias",
    "disk_logical_name",
    "storage_domain",
];

struct VmMetrics {
    up: Arc<MetricDesc>,
    illegal_images: Arc<MetricDesc>,
    cpu_cores: Arc<MetricDesc>,
    cpu_threads: Arc<MetricDesc>,
    cpu_sockets: Arc<MetricDesc>,
    snapshots: Arc<MetricDesc>,
    snapshot_max_age: Arc<MetricDesc>,
    snapshot_min_age: Arc<MetricDesc>,
    disk_provisioned_size: Arc<MetricDesc>,
    disk_actual_size: Arc<MetricDesc>,
    disk_total_size: Arc<MetricDesc>,
}

static METRICS: LazyLock<VmMetrics> = LazyLock::new(|| {
    let gauge = |name: &str, help: &str| MetricDesc::gauge(format!("{PREFIX}{name}"), help, &LABEL_NAMES);
    let disk_gauge =
        |name: &str, help: &str| MetricDesc::gauge(format!("{PREFIX}{name}"), help, &DISK_LABEL_NAMES);

    VmMetrics {
        up: gauge("up", "VM is running (1) or not (0)"),
        illegal_images: gauge(
            "illegal_images",
            "Health status of the disks attached to the VM (1 if one or more disk is in illegal state)",
        ),
        cpu_cores: gauge("cpu_cores", "Number of CPU cores assigned"),
        cpu_threads: gauge("cpu_threads", "Number of threads"),
        cpu_sockets: gauge("cpu_sockets", "Number of sockets"),
        snapshots: gauge("snapshots", "Number of snapshots"),
        snapshot_max_age: gauge("snapshot_max_age_seconds", "Age of the oldest snapshot in seconds"),
        snapshot_min_age: gauge("snapshot_min_age_seconds", "Age of the newest snapshot in seconds"),
        disk_provisioned_size: disk_gauge("disk_provisioned_size_bytes", "Provisioned size of the disk in bytes"),
        disk_actual_size: disk_gauge("disk_actual_size_bytes", "Actual size of the disk in bytes"),
        disk_total_size: disk_gauge("disk_total_size_bytes", "Total size of the disk in bytes"),
    }
});

/// Optional per-VM sub-collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmOptions {
    pub snapshots: bool,
    pub network: bool,
    pub disks: bool,
}

pub struct VmCollector {
    ctx: Arc<CollectorContext>,
    options: VmOptions,
    memo: Memoized,
}

impl VmCollector {
    pub fn new(ctx: Arc<CollectorContext>, options: VmOptions) -> Self {
        Self {
            ctx,
            options,
            memo: Memoized::new(),
        }
    }

    pub fn with_duration(mut self, histogram: Histogram) -> Self {
        self.memo = self.memo.with_duration(histogram);
        self
    }

    async fn observations(&self) -> &[Observation] {
        self.memo
            .get_or_compute(|| self.retrieve().instrument(info_span!("VmCollector.Collect")))
            .await
    }

    async fn retrieve(&self) -> Vec<Observation> {
        let vms: Vms = match self.ctx.fetch("vms").await {
            Ok(vms) => vms,
            Err(e) => {
                error!(path = "vms", error = %e, "Failed to list VMs");
                return Vec::new();
            }
        };

        let options = self.options;
        let collected = fanout::collect_all(vms.vms, |vm, recorder| {
            let ctx = Arc::clone(&self.ctx);
            let span = info_span!("VmCollector.CollectForVm", vm = %vm.name);
            async move { collect_for_vm(ctx, vm, options, recorder).await }.instrument(span)
        })
        .await;

        debug!("Collected {} VM observations", collected.observations.len());
        collected.observations
    }
}

async fn collect_for_vm(ctx: Arc<CollectorContext>, vm: Vm, options: VmOptions, recorder: Recorder) {
    let (host, cluster) = tokio::join!(ctx.host_name(vm.host_id()), ctx.cluster_name(vm.cluster_id()));
    let labels = Labels::new(&LABEL_NAMES, vec![vm.name.clone(), host, cluster]);

    recorder.record_all(base_observations(&vm, &labels.values)).await;

    let path = format!("vms/{}/statistics", vm.id);
    statistic::collect(&ctx, &recorder, &path, PREFIX, &labels).await;

    if options.network {
        network::collect_for_vm(&ctx, &recorder, &vm.id, PREFIX, &labels).await;
    }

    if options.snapshots {
        collect_snapshots(&ctx, &recorder, &vm.id, &labels).await;
    }

    if options.disks {
        collect_disks(&ctx, &recorder, &vm.id, &labels).await;
    }
}

fn base_observations(vm: &Vm, label_values: &[String]) -> Vec<Observation> {
    let m = &*METRICS;
    let topology = vm.cpu.topology;
    let obs = |desc: &Arc<MetricDesc>, value: f64| Observation::new(desc, value, label_values.to_vec());

    vec![
        obs(&m.up, if vm.status == "up" { 1.0 } else { 0.0 }),
        obs(&m.illegal_images, if vm.has_illegal_images { 1.0 } else { 0.0 }),
        obs(&m.cpu_cores, topology.cores as f64),
        obs(&m.cpu_threads, topology.threads as f64),
        obs(&m.cpu_sockets, topology.sockets as f64),
    ]
}

async fn collect_snapshots(ctx: &CollectorContext, recorder: &Recorder, vm_id: &str, labels: &Labels) {
    let path = format!("vms/{}/snapshots", vm_id);
    match ctx.fetch::<Snapshots>(&path).await {
        Ok(snapshots) => {
            let observations = snapshot_observations(&snapshots.snapshots, &labels.values, Utc::now());
            recorder.record_all(observations).await;
        }
        Err(e) => error!(path = %path, error = %e, "Failed to fetch snapshots"),
    }
}

/// Snapshot count and ages; the first entry is the active VM state and is not counted
pub fn snapshot_observations(snapshots: &[Snapshot], label_values: &[String], now: DateTime<Utc>) -> Vec<Observation> {
    let m = &*METRICS;
    let snapshots = snapshots.get(1..).unwrap_or_default();
    let obs = |desc: &Arc<MetricDesc>, value: f64| Observation::new(desc, value, label_values.to_vec());

    let mut observations = vec![obs(&m.snapshots, snapshots.len() as f64)];

    let age = |snapshot: &Snapshot| {
        snapshot
            .date
            .map(|date| (now - date.with_timezone(&Utc)).num_milliseconds().max(0) as f64 / 1000.0)
    };
    if let Some(oldest) = snapshots.iter().find_map(age) {
        observations.push(obs(&m.snapshot_max_age, oldest));
    }
    if let Some(newest) = snapshots.iter().rev().find_map(age) {
        observations.push(obs(&m.snapshot_min_age, newest));
    }

    observations
}

async fn collect_disks(ctx: &Arc<CollectorContext>, recorder: &Recorder, vm_id: &str, labels: &Labels) {
    let path = format!("vms/{}/diskattachments", vm_id);
    let attachments = match ctx.fetch::<DiskAttachments>(&path).await {
        Ok(attachments) => attachments.attachments,
        Err(e) => {
            error!(path = %path, error = %e, "Failed to fetch disk attachments");
            return;
        }
    };

    recorder
        .fan_out(attachments, |attachment, recorder| {
            let ctx = Arc::clone(ctx);
            let labels = labels.clone();
            let span = info_span!("VmCollector.CollectForAttachment", disk = %attachment.disk.id);

            async move {
                if let Err(e) = collect_for_attachment(&ctx, &recorder, &attachment, &labels).await {
                    error!(disk = %attachment.disk.id, error = %e, "Failed to collect disk metrics");
                }
            }
            .instrument(span)
        })
        .await;
}

async fn collect_for_attachment(
    ctx: &CollectorContext,
    recorder: &Recorder,
    attachment: &DiskAttachment,
    labels: &Labels,
) -> Result<()> {
    let disk_id = &attachment.disk.id;
    if disk_id.is_empty() {
        return Err(ExporterError::NotFound(format!(
            "disk of attachment '{}'",
            attachment.id
        )));
    }

    let disk: Disk = ctx.fetch(&format!("disks/{}", disk_id)).await?;
    let storage_domain = ctx.storage_domain_name(disk.storage_domain_id()).await;

    let m = &*METRICS;
    let mut values = labels.values.clone();
    values.extend([
        disk.name.clone(),
        disk.alias.clone(),
        attachment.logical_name.clone(),
        storage_domain,
    ]);
    let obs = |desc: &Arc<MetricDesc>, value: u64| Observation::new(desc, value as f64, values.clone());

    recorder
        .record_all([
            obs(&m.disk_provisioned_size, disk.provisioned_size),
            obs(&m.disk_actual_size, disk.actual_size),
            obs(&m.disk_total_size, disk.total_size),
        ])
        .await;

    Ok(())
}

#[async_trait]
impl Collector for VmCollector {
    fn name(&self) -> &'static str {
        "vm"
    }

    async fn describe(&self) -> Vec<Arc<MetricDesc>> {
        metric::descriptors(self.observations().await)
    }

    async fn collect(&self) -> Vec<Observation> {
        self.observations().await.to_vec()
    }
}
