///! Id to display-name resolution for referenced resources
///!
///! Names are assumed immutable, so a resolved entry is kept for the life of
///! the cache and never overwritten. Each id has its own cell: the map lock is
///! only held to find or insert that cell, so different ids resolve in
///! parallel while concurrent lookups of one id share a single fetch.

use std::collections::HashMap;
use std::sync::Arc;

use ovirt_common::Named;
use tokio::sync::{Mutex, OnceCell};
use tracing::error;

use crate::client::ResourceClient;

pub struct NameCache {
    collection: &'static str,
    entries: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl NameCache {
    /// Cache for `{collection}/{id}` lookups
    pub fn new(collection: &'static str) -> Self {
        Self {
            collection,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Name of `id`, or an empty string if it is unknown or cannot be fetched
    ///
    /// Failures are not stored, so the next call tries again.
    pub async fn resolve(&self, client: &ResourceClient, id: &str) -> String {
        if id.is_empty() {
            return String::new();
        }

        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(id.to_string()).or_default())
        };

        let path = format!("{}/{}", self.collection, id);
        let resolved = cell
            .get_or_try_init(|| async {
                client
                    .fetch_and_decode::<Named>(&path)
                    .await
                    .map(|named| named.name)
            })
            .await;

        match resolved {
            Ok(name) => name.clone(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to resolve name");
                String::new()
            }
        }
    }

    /// Number of ids with a stored name
    pub async fn resolved(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }
}

/// One cache per referenced collection
pub struct NameResolver {
    pub hosts: NameCache,
    pub clusters: NameCache,
    pub storage_domains: NameCache,
}

impl NameResolver {
    pub fn new() -> Self {
        Self {
            hosts: NameCache::new("hosts"),
            clusters: NameCache::new("clusters"),
            storage_domains: NameCache::new("storagedomains"),
        }
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}
