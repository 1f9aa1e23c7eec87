///! Host collector (`ovirt_host_*`)

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use ovirt_common::{Host, Hosts};
use prometheus::Histogram;
use regex::Regex;
use tracing::{debug, error, info_span, Instrument};

use super::fanout::{self, Recorder};
use super::{network, statistic, Collector, CollectorContext, Memoized};
use crate::metric::{self, Labels, MetricDesc, Observation};

const PREFIX: &str = "ovirt_host_";
const LABEL_NAMES: [&str; 2] = ["name", "cluster"];

static MAINTENANCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"maintenance|installing").unwrap());

struct HostMetrics {
    up: Arc<MetricDesc>,
    memory: Arc<MetricDesc>,
    cpu_cores: Arc<MetricDesc>,
    cpu_threads: Arc<MetricDesc>,
    cpu_sockets: Arc<MetricDesc>,
    cpu_speed: Arc<MetricDesc>,
}

static METRICS: LazyLock<HostMetrics> = LazyLock::new(|| {
    let gauge = |name: &str, help: &str| MetricDesc::gauge(format!("{PREFIX}{name}"), help, &LABEL_NAMES);

    HostMetrics {
        up: gauge("up", "Host status is up (1) or not (0) or on maintenance (2)"),
        memory: gauge("memory_installed_bytes", "Memory installed in bytes"),
        cpu_cores: gauge("cpu_cores", "Number of CPU cores assigned"),
        cpu_threads: gauge("cpu_threads", "Number of threads"),
        cpu_sockets: gauge("cpu_sockets", "Number of sockets"),
        cpu_speed: gauge("cpu_speed_hertz", "CPU speed in hertz"),
    }
});

/// Value of `ovirt_host_up` for an engine status string
pub fn status_value(status: &str) -> f64 {
    if status == "up" {
        1.0
    } else if MAINTENANCE_REGEX.is_match(status) {
        2.0
    } else {
        0.0
    }
}

pub struct HostCollector {
    ctx: Arc<CollectorContext>,
    collect_network: bool,
    memo: Memoized,
}

impl HostCollector {
    pub fn new(ctx: Arc<CollectorContext>, collect_network: bool) -> Self {
        Self {
            ctx,
            collect_network,
            memo: Memoized::new(),
        }
    }

    pub fn with_duration(mut self, histogram: Histogram) -> Self {
        self.memo = self.memo.with_duration(histogram);
        self
    }

    async fn observations(&self) -> &[Observation] {
        self.memo
            .get_or_compute(|| self.retrieve().instrument(info_span!("HostCollector.Collect")))
            .await
    }

    async fn retrieve(&self) -> Vec<Observation> {
        let hosts: Hosts = match self.ctx.fetch("hosts").await {
            Ok(hosts) => hosts,
            Err(e) => {
                error!(path = "hosts", error = %e, "Failed to list hosts");
                return Vec::new();
            }
        };

        let collect_network = self.collect_network;
        let collected = fanout::collect_all(hosts.hosts, |host, recorder| {
            let ctx = Arc::clone(&self.ctx);
            let span = info_span!("HostCollector.CollectForHost", host = %host.name);
            async move { collect_for_host(ctx, host, collect_network, recorder).await }.instrument(span)
        })
        .await;

        debug!("Collected {} host observations", collected.observations.len());
        collected.observations
    }
}

async fn collect_for_host(ctx: Arc<CollectorContext>, host: Host, collect_network: bool, recorder: Recorder) {
    let cluster = ctx.cluster_name(host.cluster_id()).await;
    let labels = Labels::new(&LABEL_NAMES, vec![host.name.clone(), cluster]);

    recorder.record_all(base_observations(&host, &labels.values)).await;

    let path = format!("hosts/{}/statistics", host.id);
    statistic::collect(&ctx, &recorder, &path, PREFIX, &labels).await;

    if collect_network {
        network::collect_for_host(&ctx, &recorder, &host.id, PREFIX, &labels).await;
    }
}

fn base_observations(host: &Host, label_values: &[String]) -> Vec<Observation> {
    let m = &*METRICS;
    let topology = host.cpu.topology;
    let obs = |desc: &Arc<MetricDesc>, value: f64| Observation::new(desc, value, label_values.to_vec());

    vec![
        obs(&m.up, status_value(&host.status)),
        obs(&m.memory, host.memory as f64),
        obs(&m.cpu_cores, topology.cores as f64),
        obs(&m.cpu_threads, topology.threads as f64),
        obs(&m.cpu_sockets, topology.sockets as f64),
        obs(&m.cpu_speed, host.cpu.speed * 1e6),
    ]
}

#[async_trait]
impl Collector for HostCollector {
    fn name(&self) -> &'static str {
        "host"
    }

    async fn describe(&self) -> Vec<Arc<MetricDesc>> {
        metric::descriptors(self.observations().await)
    }

    async fn collect(&self) -> Vec<Observation> {
        self.observations().await.to_vec()
    }
}
