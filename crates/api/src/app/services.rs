use std::sync::Arc;

use chrono::Utc;

use stockrecon_core::ItemId;
use stockrecon_infra::{
    InMemoryItemStore, ItemStore, PostgresItemStore, ReconcilerConfig, StockReconciler, StoreError,
};
use stockrecon_inventory::Item;

use crate::config::Config;

/// Which store backs the running service.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::InMemory => "in-memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

/// Shared state behind every handler.
pub struct AppServices {
    reconciler: StockReconciler<Arc<dyn ItemStore>>,
    backend: StoreBackend,
}

impl AppServices {
    pub fn new(store: Arc<dyn ItemStore>, config: ReconcilerConfig, backend: StoreBackend) -> Self {
        Self {
            reconciler: StockReconciler::new(store, config),
            backend,
        }
    }

    /// Services over an existing in-memory store (tests keep a handle to inspect it).
    pub fn in_memory(store: Arc<InMemoryItemStore>, config: ReconcilerConfig) -> Self {
        Self::new(store, config, StoreBackend::InMemory)
    }

    pub fn reconciler(&self) -> &StockReconciler<Arc<dyn ItemStore>> {
        &self.reconciler
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }
}

/// Select and prepare the item store described by `config`.
pub async fn build_services(config: &Config) -> Result<AppServices, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresItemStore::connect(url).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres item store");
            Ok(AppServices::new(
                Arc::new(store),
                config.reconciler,
                StoreBackend::Postgres,
            ))
        }
        None => {
            let store = Arc::new(InMemoryItemStore::new());
            if config.seed_demo_items {
                for item in demo_items() {
                    store.insert(item)?;
                }
                tracing::info!("seeded in-memory store with demo items");
            } else {
                tracing::warn!("DATABASE_URL not set; using an empty in-memory item store");
            }
            Ok(AppServices::in_memory(store, config.reconciler))
        }
    }
}

/// A small catalog for local runs.
pub fn demo_items() -> Vec<Item> {
    let now = Utc::now();
    [
        (1, "Widget", 25, 5, true),
        (2, "Gizmo", 10, 3, true),
        (3, "Sprocket", 2, 5, true),
        (4, "Legacy Gadget", 50, 0, false),
    ]
    .into_iter()
    .filter_map(|(id, name, quantity, min, active)| {
        Item::restore(ItemId::new(id), name.to_string(), quantity, min, active, now).ok()
    })
    .collect()
}
