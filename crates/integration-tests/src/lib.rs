//! Integration test support for the Ledger dashboard.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests against the in-memory store
//! cargo test -p ledger-integration-tests
//!
//! # Include tests against a live PostgreSQL database
//! LEDGER_TEST_DATABASE_URL=postgres://... cargo test -p ledger-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `invoice_routes` - Full router, in-memory store
//! - `postgres_store` - `PgInvoiceStore` against a real database (ignored by default)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use ledger_core::InvoiceId;
use ledger_dashboard::db::{BoxedConnection, InvoiceConnection, InvoiceStore, StoreError};
use ledger_dashboard::models::{Invoice, InvoiceChanges, NewInvoice};

/// An [`InvoiceStore`] that keeps rows in memory.
///
/// Counts connections handed out and released, and can be switched
/// offline to simulate an unreachable database. A list read can be paused
/// after it has taken its snapshot, to interleave other requests with it.
#[derive(Debug, Clone, Default)]
pub struct MemoryInvoiceStore {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    rows: Mutex<HashMap<String, Invoice>>,
    offline: AtomicBool,
    acquired: AtomicUsize,
    released: AtomicUsize,
    list_pause: Mutex<Option<PauseHooks>>,
}

#[derive(Debug)]
struct PauseHooks {
    listed: oneshot::Sender<()>,
    resume: oneshot::Receiver<()>,
}

/// Control over a paused list read. See [`MemoryInvoiceStore::pause_next_list`].
#[derive(Debug)]
pub struct ListPause {
    listed: oneshot::Receiver<()>,
    resume: oneshot::Sender<()>,
}

impl ListPause {
    /// Wait until the paused read has taken its snapshot of the rows.
    pub async fn wait_until_listed(&mut self) {
        let _ = (&mut self.listed).await;
    }

    /// Let the paused read return its snapshot.
    pub fn resume(self) {
        let _ = self.resume.send(());
    }
}

impl MemoryInvoiceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `connect` calls fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of connections handed out so far.
    #[must_use]
    pub fn acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    /// Number of connections released so far.
    #[must_use]
    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Pause the next `list` call after it has read the rows.
    #[must_use]
    pub fn pause_next_list(&self) -> ListPause {
        let (listed_tx, listed_rx) = oneshot::channel();
        let (resume_tx, resume_rx) = oneshot::channel();
        if let Ok(mut pause) = self.inner.list_pause.lock() {
            *pause = Some(PauseHooks {
                listed: listed_tx,
                resume: resume_rx,
            });
        }
        ListPause {
            listed: listed_rx,
            resume: resume_tx,
        }
    }

    /// Insert a row directly, bypassing validation.
    pub fn seed(&self, invoice: Invoice) {
        if let Ok(mut rows) = self.inner.rows.lock() {
            rows.insert(invoice.id.to_string(), invoice);
        }
    }

    /// A snapshot of the stored row with `id`.
    #[must_use]
    pub fn row(&self, id: &str) -> Option<Invoice> {
        self.inner.rows.lock().ok()?.get(id).cloned()
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.rows.lock().map_or(0, |rows| rows.len())
    }

    /// Whether the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn connect(&self) -> Result<BoxedConnection, StoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            shared: Arc::clone(&self.inner),
        }))
    }
}

struct MemoryConnection {
    shared: Arc<Shared>,
}

impl MemoryConnection {
    fn rows(&self) -> Result<MutexGuard<'_, HashMap<String, Invoice>>, StoreError> {
        self.shared
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.shared.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl InvoiceConnection for MemoryConnection {
    async fn insert(&mut self, invoice: &NewInvoice) -> Result<InvoiceId, StoreError> {
        let id = InvoiceId::new(uuid::Uuid::new_v4().to_string());
        self.rows()?.insert(
            id.to_string(),
            Invoice {
                id: id.clone(),
                customer_id: invoice.customer_id.clone(),
                amount: invoice.amount,
                status: invoice.status,
                date: invoice.date,
            },
        );
        Ok(id)
    }

    async fn update(
        &mut self,
        id: &InvoiceId,
        changes: &InvoiceChanges,
    ) -> Result<u64, StoreError> {
        let mut rows = self.rows()?;
        let Some(row) = rows.get_mut(id.as_str()) else {
            return Ok(0);
        };
        row.customer_id = changes.customer_id.clone();
        row.amount = changes.amount;
        row.status = changes.status;
        Ok(1)
    }

    async fn delete(&mut self, id: &InvoiceId) -> Result<u64, StoreError> {
        Ok(u64::from(self.rows()?.remove(id.as_str()).is_some()))
    }

    async fn list(&mut self) -> Result<Vec<Invoice>, StoreError> {
        let mut invoices: Vec<Invoice> = self.rows()?.values().cloned().collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.as_str().cmp(b.id.as_str())));

        let pause = self
            .shared
            .list_pause
            .lock()
            .ok()
            .and_then(|mut pause| pause.take());
        if let Some(hooks) = pause {
            let _ = hooks.listed.send(());
            let _ = hooks.resume.await;
        }
        Ok(invoices)
    }

    async fn get(&mut self, id: &InvoiceId) -> Result<Option<Invoice>, StoreError> {
        Ok(self.rows()?.get(id.as_str()).cloned())
    }
}
