//! Per-resource-type collectors
//!
//! A collector lists one resource collection, fans out one task per resource
//! and gathers every observation those tasks record. Its result is computed
//! at most once per instance and shared by `describe()` and `collect()`.

pub mod fanout;
pub mod host;
pub mod names;
pub mod network;
pub mod statistic;
pub mod storage_domain;
pub mod vm;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use prometheus::Histogram;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

pub use host::HostCollector;
pub use names::{NameCache, NameResolver};
pub use storage_domain::StorageDomainCollector;
pub use vm::VmCollector;

use crate::client::ResourceClient;
use crate::error::Result;
use crate::metric::{MetricDesc, Observation};

#[async_trait]
pub trait Collector: Send + Sync {
    /// Label value for the collector duration histogram
    fn name(&self) -> &'static str;

    /// Descriptors of every metric this instance produces
    async fn describe(&self) -> Vec<Arc<MetricDesc>>;

    /// Every observation of this instance
    async fn collect(&self) -> Vec<Observation>;
}

/// What every collection task needs: the client and the name caches
pub struct CollectorContext {
    client: Arc<ResourceClient>,
    names: Arc<NameResolver>,
}

impl CollectorContext {
    pub fn new(client: Arc<ResourceClient>, names: Arc<NameResolver>) -> Self {
        Self { client, names }
    }

    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.client.fetch_and_decode(path).await
    }

    pub async fn host_name(&self, id: &str) -> String {
        self.names.hosts.resolve(&self.client, id).await
    }

    pub async fn cluster_name(&self, id: &str) -> String {
        self.names.clusters.resolve(&self.client, id).await
    }

    pub async fn storage_domain_name(&self, id: &str) -> String {
        self.names.storage_domains.resolve(&self.client, id).await
    }
}

/// Observation set computed once per collector instance
#[derive(Default)]
pub struct Memoized {
    cell: OnceCell<Vec<Observation>>,
    duration: Option<Histogram>,
}

impl Memoized {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe how long the computation takes
    pub fn with_duration(mut self, histogram: Histogram) -> Self {
        self.duration = Some(histogram);
        self
    }

    /// Run `compute` on first use; later and concurrent callers get its result
    pub async fn get_or_compute<F, Fut>(&self, compute: F) -> &[Observation]
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Observation>>,
    {
        self.cell
            .get_or_init(|| async {
                let _timer = self.duration.as_ref().map(|h| h.start_timer());
                compute().await
            })
            .await
    }

    pub fn is_populated(&self) -> bool {
        self.cell.initialized()
    }
}
