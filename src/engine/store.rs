use async_trait::async_trait;
use dashmap::DashMap;

use crate::model::*;

use super::error::{CatalogError, StoreError};

/// Read side of the booking store. The engine owns no order lifecycle.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Orders whose status is one of `statuses` and whose date range is present,
    /// each with its reserved items.
    async fn dated_orders(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, StoreError>;
}

/// Decorative product metadata. Failures are tolerated by the engine.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product(&self, id: ProductId) -> Result<Option<ProductMeta>, CatalogError>;
}

/// Catalog that knows nothing.
pub struct NoCatalog;

#[async_trait]
impl ProductCatalog for NoCatalog {
    async fn product(&self, _id: ProductId) -> Result<Option<ProductMeta>, CatalogError> {
        Ok(None)
    }
}

// ── In-memory implementations ────────────────────────────────────

pub struct InMemoryStore {
    orders: DashMap<OrderId, Order>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }

    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let store = Self::new();
        for order in orders {
            store.upsert(order);
        }
        store
    }

    /// Insert or replace an order by id.
    pub fn upsert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn remove(&self, id: &OrderId) -> Option<Order> {
        self.orders.remove(id).map(|(_, order)| order)
    }

    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn dated_orders(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|e| e.dates.is_some() && statuses.contains(&e.status))
            .map(|e| e.value().clone())
            .collect();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }
}

pub struct InMemoryCatalog {
    products: DashMap<ProductId, ProductMeta>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
        }
    }

    pub fn insert(&self, meta: ProductMeta) {
        self.products.insert(meta.id, meta);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn product(&self, id: ProductId) -> Result<Option<ProductMeta>, CatalogError> {
        Ok(self.products.get(&id).map(|e| e.value().clone()))
    }
}
