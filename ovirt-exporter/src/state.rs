//! Application State
//!
//! Everything that outlives a single scrape: configuration, the API client,
//! the name caches and the exporter's own metric registry.

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::client::{ResourceClient, Transport};
use crate::collector::vm::VmOptions;
use crate::collector::{Collector, CollectorContext, HostCollector, NameResolver, StorageDomainCollector, VmCollector};
use crate::config::ExporterConfig;
use crate::error::Result;
use crate::exposition::Exposition;

pub struct AppState {
    pub config: ExporterConfig,
    pub client: Arc<ResourceClient>,
    pub names: Arc<NameResolver>,
    pub exposition: Exposition,
}

impl AppState {
    pub fn new(config: ExporterConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let client = Arc::new(ResourceClient::new(
            transport,
            config.collector.max_concurrent_requests,
        ));

        Ok(Self {
            config,
            client,
            names: Arc::new(NameResolver::new()),
            exposition: Exposition::new()?,
        })
    }

    /// Fresh collectors for one scrape
    pub fn collectors(&self) -> Vec<Box<dyn Collector>> {
        let ctx = Arc::new(CollectorContext::new(
            Arc::clone(&self.client),
            Arc::clone(&self.names),
        ));
        let options = &self.config.collector;
        let vm_options = VmOptions {
            snapshots: options.with_snapshots,
            network: options.with_network,
            disks: options.with_disks,
        };

        vec![
            Box::new(
                HostCollector::new(Arc::clone(&ctx), options.with_network)
                    .with_duration(self.exposition.collector_duration("host")),
            ),
            Box::new(VmCollector::new(Arc::clone(&ctx), vm_options).with_duration(self.exposition.collector_duration("vm"))),
            Box::new(
                StorageDomainCollector::new(ctx).with_duration(self.exposition.collector_duration("storage_domain")),
            ),
        ]
    }

    /// Run every collector concurrently and encode the result
    pub async fn scrape(&self) -> Result<String> {
        let collectors = self.collectors();
        let results = join_all(collectors.iter().map(|c| c.collect())).await;

        for (collector, observations) in collectors.iter().zip(&results) {
            debug!("Collector {} returned {} observations", collector.name(), observations.len());
        }

        let observations: Vec<_> = results.into_iter().flatten().collect();
        self.exposition.encode(&observations)
    }
}
