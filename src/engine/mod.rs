mod availability;
mod classify;
mod conflict;
mod error;
mod overlap;
mod store;
mod summary;

pub use availability::{bucket_for, count_buckets, days_remaining, equipment_in_field};
pub use classify::{alternative_windows, classify_product, priority_for, severity_for, suggest_resolution};
pub use conflict::find_conflicts;
pub use error::{CatalogError, EngineError, StoreError, Violation};
pub use overlap::{overlap, rounded_percent, Overlap};
pub use store::{BookingStore, InMemoryCatalog, InMemoryStore, NoCatalog, ProductCatalog};
pub use summary::summarize;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use time::{Date, UtcOffset};
use tracing::{debug, warn};

use crate::model::*;
use crate::observability;
use crate::request::{BookingRequest, RawBookingRequest};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// How many days past their return date overdue orders stay tracked.
    pub overdue_lookback_days: u32,
    /// Offset used to turn loose timestamps into calendar dates.
    pub reference_offset: UtcOffset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overdue_lookback_days: 0,
            reference_offset: UtcOffset::UTC,
        }
    }
}

/// Conflict and availability engine. Stateless between calls: every
/// operation reads a fresh snapshot from the store and computes in memory.
pub struct Engine {
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn ProductCatalog>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn ProductCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Engine without product metadata and with default config.
    pub fn with_store(store: Arc<dyn BookingStore>) -> Self {
        Self::new(store, Arc::new(NoCatalog), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Conflict path ────────────────────────────────────────

    /// All active orders that hold a requested product during the requested
    /// window, most severe first.
    pub async fn detect_conflicts(
        &self,
        request: &BookingRequest,
    ) -> Result<Vec<ConflictRecord>, EngineError> {
        let started = Instant::now();
        let result = self.scan(request).await;
        record_check(result.as_ref().map(|_| ()), started);
        result
    }

    /// Conflicts plus the rolled-up verdict.
    pub async fn check_booking(&self, request: &BookingRequest) -> Result<ConflictReport, EngineError> {
        let conflicts = self.detect_conflicts(request).await?;
        let summary = summarize(&conflicts);
        Ok(ConflictReport { conflicts, summary })
    }

    /// Validate a loosely typed request and check it. Invalid input never
    /// reaches the store.
    pub async fn check_raw_booking(&self, raw: &RawBookingRequest) -> Result<ConflictReport, EngineError> {
        let request = match raw.validate(self.config.reference_offset) {
            Ok(request) => request,
            Err(e) => {
                debug!("rejected booking check: {e}");
                record_check(Err(&e), Instant::now());
                return Err(e);
            }
        };
        self.check_booking(&request).await
    }

    async fn scan(&self, request: &BookingRequest) -> Result<Vec<ConflictRecord>, EngineError> {
        let orders = self.active_orders().await?;
        let mut records = find_conflicts(request, &orders);

        let ids: BTreeSet<ProductId> = records
            .iter()
            .flat_map(|r| r.conflicting_products.iter().map(|p| p.product_id))
            .collect();
        let meta = self.lookup_products(ids).await;
        for record in &mut records {
            for product in &mut record.conflicting_products {
                if let Some(m) = meta.get(&product.product_id) {
                    product.sku = m.sku.clone();
                    product.image = m.image.clone();
                    if product.product_name.is_empty() {
                        product.product_name = m.name.clone();
                    }
                }
            }
            metrics::counter!(
                observability::CONFLICTS_DETECTED_TOTAL,
                "severity" => record.conflict_severity.as_str()
            )
            .increment(1);
        }

        debug!(
            "conflict scan {} for products {:?}: {} orders checked, {} conflicts",
            request.range(),
            request.product_ids(),
            orders.len(),
            records.len()
        );
        Ok(records)
    }

    // ── Availability path ────────────────────────────────────

    /// Equipment out with active orders as of `as_of`, most urgent return first.
    pub async fn currently_rented(&self, as_of: Date) -> Result<Vec<EquipmentInField>, EngineError> {
        let orders = self.active_orders().await?;
        let mut rows = equipment_in_field(&orders, as_of, self.config.overdue_lookback_days);

        let ids: BTreeSet<ProductId> = rows.iter().map(|r| r.product_id).collect();
        let meta = self.lookup_products(ids).await;
        for row in &mut rows {
            if let Some(m) = meta.get(&row.product_id) {
                row.product_image = m.image.clone();
                if row.product_name.is_empty() {
                    row.product_name = m.name.clone();
                }
            }
        }
        Ok(rows)
    }

    pub async fn field_report(&self, as_of: Date) -> Result<FieldReport, EngineError> {
        let rows = self.currently_rented(as_of).await?;
        let counts = count_buckets(&rows);
        Ok(FieldReport { as_of, rows, counts })
    }

    // ── Adapters ─────────────────────────────────────────────

    async fn active_orders(&self) -> Result<Vec<Order>, EngineError> {
        self.store
            .dated_orders(&OrderStatus::ACTIVE)
            .await
            .map_err(|e| {
                warn!("booking store query failed: {e}");
                EngineError::Store(e)
            })
    }

    /// Concurrent metadata lookups. Failed lookups are logged and left out.
    async fn lookup_products(&self, ids: BTreeSet<ProductId>) -> HashMap<ProductId, ProductMeta> {
        let lookups = ids
            .into_iter()
            .map(|id| async move { (id, self.catalog.product(id).await) });
        let mut found = HashMap::new();
        for (id, result) in futures::future::join_all(lookups).await {
            match result {
                Ok(Some(meta)) => {
                    found.insert(id, meta);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("product metadata unavailable, using defaults: {e}");
                    metrics::counter!(observability::ENRICHMENT_FAILURES_TOTAL).increment(1);
                }
            }
        }
        found
    }
}

fn record_check(outcome: Result<(), &EngineError>, started: Instant) {
    let label = match outcome {
        Ok(()) => "ok",
        Err(e) => e.kind_label(),
    };
    metrics::counter!(observability::CONFLICT_CHECKS_TOTAL, "outcome" => label).increment(1);
    metrics::histogram!(observability::CONFLICT_CHECK_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
}
