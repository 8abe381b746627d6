//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::ViewCache;
use crate::db::InvoiceStore;
use crate::services::InvoiceService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn InvoiceStore>,
    cache: ViewCache,
    invoices: InvoiceService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Invoice store (Postgres in production, in-memory in tests)
    /// * `cache` - Rendered-view cache shared by readers and mutations
    #[must_use]
    pub fn new(store: Arc<dyn InvoiceStore>, cache: ViewCache) -> Self {
        let invoices = InvoiceService::new(Arc::clone(&store), cache.clone());
        Self::with_service(store, cache, invoices)
    }

    /// Create a state around an already-configured service.
    #[must_use]
    pub fn with_service(
        store: Arc<dyn InvoiceStore>,
        cache: ViewCache,
        invoices: InvoiceService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                cache,
                invoices,
            }),
        }
    }

    /// Get a reference to the invoice store.
    #[must_use]
    pub fn store(&self) -> &dyn InvoiceStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the rendered-view cache.
    #[must_use]
    pub fn cache(&self) -> &ViewCache {
        &self.inner.cache
    }

    /// Get a reference to the invoice mutation service.
    #[must_use]
    pub fn invoices(&self) -> &InvoiceService {
        &self.inner.invoices
    }
}
