//! Exporter — the registry and its active collector behind one lock.
//!
//! Mutations run as a single unit under the write lock: apply to a copy
//! of the registry, persist the copy, then commit it together with a
//! freshly built collector. Scrapes clone the active collector under the
//! read lock and probe after releasing it.

use std::sync::Arc;

use siteprobe_core::{Registry, RegistryError, Target};
use siteprobe_health::Prober;
use siteprobe_state::{StoreError, TargetStore};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::collector::{Collector, MetricDescriptor, MetricSample};

/// Errors returned by exporter operations.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to persist targets")]
    Persist(#[source] StoreError),

    #[error("failed to load targets")]
    Load(#[source] StoreError),
}

struct Inner {
    registry: Registry,
    collector: Arc<Collector>,
}

/// Owns the target registry, the active collector and the store.
pub struct Exporter {
    inner: RwLock<Inner>,
    store: Arc<dyn TargetStore>,
    prober: Prober,
}

impl Exporter {
    /// Load the persisted targets and build the first collector.
    pub fn open(store: Arc<dyn TargetStore>, prober: Prober) -> Result<Self, ExporterError> {
        let targets = store.load().map_err(ExporterError::Load)?;
        let registry = Registry::from_targets(targets)?;
        let collector = Arc::new(Collector::new(registry.list()));
        info!(targets = registry.len(), "exporter initialized");

        Ok(Self {
            inner: RwLock::new(Inner {
                registry,
                collector,
            }),
            store,
            prober,
        })
    }

    /// All targets in insertion order.
    pub async fn list(&self) -> Vec<Target> {
        self.inner.read().await.registry.list().to_vec()
    }

    pub async fn find(&self, name: &str) -> Result<Target, ExporterError> {
        let inner = self.inner.read().await;
        Ok(inner.registry.find(name)?.clone())
    }

    /// Descriptors of the active collector.
    pub async fn describe(&self) -> Vec<MetricDescriptor> {
        self.inner.read().await.collector.describe().to_vec()
    }

    pub async fn add(&self, target: Target) -> Result<(), ExporterError> {
        let name = target.name.clone();
        self.mutate("added", &name, |registry| registry.add(target))
            .await
    }

    pub async fn update(&self, name: &str, address: &str) -> Result<(), ExporterError> {
        self.mutate("updated", name, |registry| registry.update(name, address))
            .await
    }

    pub async fn remove(&self, name: &str) -> Result<(), ExporterError> {
        self.mutate("removed", name, |registry| registry.remove(name).map(|_| ()))
            .await
    }

    /// Probe every target of the active collector.
    pub async fn scrape(&self) -> Vec<MetricSample> {
        let collector = self.inner.read().await.collector.clone();
        collector.collect(&self.prober).await
    }

    /// Apply, persist, and publish a registry change as one unit.
    async fn mutate<F>(&self, action: &str, name: &str, op: F) -> Result<(), ExporterError>
    where
        F: FnOnce(&mut Registry) -> Result<(), RegistryError>,
    {
        let mut inner = self.inner.write().await;

        let mut next = inner.registry.clone();
        op(&mut next)?;

        if let Err(e) = self.persist(next.list().to_vec()).await {
            error!(site = %name, error = %e, "failed to persist targets, change discarded");
            return Err(ExporterError::Persist(e));
        }

        inner.collector = Arc::new(Collector::new(next.list()));
        inner.registry = next;
        info!(site = %name, targets = inner.registry.len(), "target {action}");
        Ok(())
    }

    /// Store I/O is blocking; it runs on the blocking pool while the
    /// caller keeps the write lock.
    async fn persist(&self, targets: Vec<Target>) -> Result<(), StoreError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.save(&targets))
            .await
            .map_err(|e| StoreError::Unavailable(format!("save task failed: {e}")))?
    }
}
