///! Storage domain collector (`ovirt_storage_*`)

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use ovirt_common::{StorageDomain, StorageDomains};
use prometheus::Histogram;
use tracing::{debug, error, info_span, Instrument};

use super::fanout;
use super::{Collector, CollectorContext, Memoized};
use crate::metric::{self, MetricDesc, Observation};

const PREFIX: &str = "ovirt_storage_";
const LABEL_NAMES: [&str; 3] = ["name", "type", "path"];

struct StorageMetrics {
    up: Arc<MetricDesc>,
    master: Arc<MetricDesc>,
    available: Arc<MetricDesc>,
    used: Arc<MetricDesc>,
    committed: Arc<MetricDesc>,
}

static METRICS: LazyLock<StorageMetrics> = LazyLock::new(|| {
    let gauge = |name: &str, help: &str| MetricDesc::gauge(format!("{PREFIX}{name}"), help, &LABEL_NAMES);

    StorageMetrics {
        up: gauge("up", "Status of storage domain"),
        master: gauge("master", "Storage domain is master"),
        available: gauge("available_bytes", "Available space in bytes"),
        used: gauge("used_bytes", "Used space in bytes"),
        committed: gauge("committed_bytes", "Committed space in bytes"),
    }
});

pub struct StorageDomainCollector {
    ctx: Arc<CollectorContext>,
    memo: Memoized,
}

impl StorageDomainCollector {
    pub fn new(ctx: Arc<CollectorContext>) -> Self {
        Self {
            ctx,
            memo: Memoized::new(),
        }
    }

    pub fn with_duration(mut self, histogram: Histogram) -> Self {
        self.memo = self.memo.with_duration(histogram);
        self
    }

    async fn observations(&self) -> &[Observation] {
        self.memo
            .get_or_compute(|| self.retrieve().instrument(info_span!("StorageDomainCollector.Collect")))
            .await
    }

    async fn retrieve(&self) -> Vec<Observation> {
        let domains: StorageDomains = match self.ctx.fetch("storagedomains").await {
            Ok(domains) => domains,
            Err(e) => {
                error!(path = "storagedomains", error = %e, "Failed to list storage domains");
                return Vec::new();
            }
        };

        let collected = fanout::collect_all(domains.domains, |domain, recorder| async move {
            recorder.record_all(domain_observations(&domain)).await;
        })
        .await;

        debug!("Collected {} storage domain observations", collected.observations.len());
        collected.observations
    }
}

fn domain_observations(domain: &StorageDomain) -> Vec<Observation> {
    let m = &*METRICS;
    let labels = vec![
        domain.name.clone(),
        domain.domain_type.clone(),
        domain.storage.path.clone(),
    ];
    let obs = |desc: &Arc<MetricDesc>, value: f64| Observation::new(desc, value, labels.clone());
    let flag = |b: bool| if b { 1.0 } else { 0.0 };

    vec![
        obs(&m.up, flag(domain.external_status == "ok")),
        obs(&m.master, flag(domain.master)),
        obs(&m.available, domain.available),
        obs(&m.used, domain.used),
        obs(&m.committed, domain.committed),
    ]
}

#[async_trait]
impl Collector for StorageDomainCollector {
    fn name(&self) -> &'static str {
        "storage_domain"
    }

    async fn describe(&self) -> Vec<Arc<MetricDesc>> {
        metric::descriptors(self.observations().await)
    }

    async fn collect(&self) -> Vec<Observation> {
        self.observations().await.to_vec()
    }
}
