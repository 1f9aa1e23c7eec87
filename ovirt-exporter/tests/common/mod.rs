//! Common test utilities and helpers
//!
//! `ScriptedTransport` answers API paths from an in-memory table, counts
//! every request and can be told to fail selected paths.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ovirt_exporter::client::{ResourceClient, Transport};
use ovirt_exporter::collector::{CollectorContext, NameResolver};
use ovirt_exporter::metric::Observation;
use ovirt_exporter::{ExporterError, Result};

#[derive(Default)]
pub struct ScriptedTransport {
    responses: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: &str, body: impl Into<String>) -> Self {
        self.responses.insert(path.to_string(), body.into());
        self
    }

    /// Answer `path` with HTTP 500
    pub fn fail(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Sleep before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<String> {
        *self.fetches.lock().unwrap().entry(path.to_string()).or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(path) {
            return Err(ExporterError::Status {
                path: path.to_string(),
                status: 500,
            });
        }

        self.responses.get(path).cloned().ok_or_else(|| ExporterError::Status {
            path: path.to_string(),
            status: 404,
        })
    }
}

/// Collector context over `transport` with fresh name caches
pub fn context(transport: Arc<ScriptedTransport>) -> Arc<CollectorContext> {
    let client = Arc::new(ResourceClient::new(transport, 16));
    Arc::new(CollectorContext::new(client, Arc::new(NameResolver::new())))
}

/// Observations called `name` whose `label` equals `value`
pub fn find<'a>(observations: &'a [Observation], name: &str, label: &str, value: &str) -> Vec<&'a Observation> {
    observations
        .iter()
        .filter(|o| o.name() == name && o.label(label) == Some(value))
        .collect()
}

pub fn count(observations: &[Observation], name: &str) -> usize {
    observations.iter().filter(|o| o.name() == name).count()
}

// Fixtures

pub fn named(kind: &str, id: &str, name: &str) -> String {
    format!(r#"<{kind} href="/ovirt-engine/api/x/{id}" id="{id}"><name>{name}</name></{kind}>"#)
}

pub fn host(id: &str, name: &str, cluster_id: &str, status: &str) -> String {
    format!(
        r#"<host href="/ovirt-engine/api/hosts/{id}" id="{id}">
            <name>{name}</name>
            <cpu><speed>2400</speed><topology><cores>4</cores><sockets>1</sockets><threads>2</threads></topology></cpu>
            <memory>17179869184</memory>
            <status>{status}</status>
            <cluster href="/ovirt-engine/api/clusters/{cluster_id}" id="{cluster_id}"/>
        </host>"#
    )
}

pub fn hosts(entries: &[String]) -> String {
    format!("<hosts>{}</hosts>", entries.concat())
}

pub fn vm(id: &str, name: &str, host_id: Option<&str>, cluster_id: &str, status: &str) -> String {
    let host = host_id
        .map(|h| format!(r#"<host href="/ovirt-engine/api/hosts/{h}" id="{h}"/>"#))
        .unwrap_or_default();
    format!(
        r#"<vm href="/ovirt-engine/api/vms/{id}" id="{id}">
            <name>{name}</name>
            <cpu><topology><cores>2</cores><sockets>1</sockets><threads>1</threads></topology></cpu>
            <has_illegal_images>false</has_illegal_images>
            <status>{status}</status>
            {host}
            <cluster href="/ovirt-engine/api/clusters/{cluster_id}" id="{cluster_id}"/>
        </vm>"#
    )
}

pub fn vms(entries: &[String]) -> String {
    format!("<vms>{}</vms>", entries.concat())
}

/// One sample as (name, kind, type, unit, datum)
pub fn statistics(samples: &[(&str, &str, &str, &str, f64)]) -> String {
    let body: String = samples
        .iter()
        .map(|(name, kind, value_type, unit, datum)| {
            format!(
                r#"<statistic id="{name}">
                    <name>{name}</name>
                    <description>{name}</description>
                    <kind>{kind}</kind>
                    <type>{value_type}</type>
                    <unit>{unit}</unit>
                    <values><value><datum>{datum}</datum></value></values>
                </statistic>"#
            )
        })
        .collect();
    format!("<statistics>{body}</statistics>")
}
