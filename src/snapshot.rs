//! File-backed booking store.
//!
//! Reads a JSON export of the commerce database:
//!
//! ```json
//! {
//!   "orders": [
//!     { "id": 7, "projectName": "Spring shoot", "status": "processing",
//!       "startDate": "2024-06-13", "endDate": "2024-06-20",
//!       "reservedItems": "[{\"productId\":2,\"productName\":\"Light kit\",\"quantity\":1}]",
//!       "customerName": "Dana", "customerEmail": "dana@example.com" }
//!   ],
//!   "products": [ { "id": 2, "name": "Light kit", "sku": "LK-2", "image": "lk.jpg" } ]
//! }
//! ```
//!
//! The export is loosely typed: reserved items may be an array or a string
//! holding an array, ids may be numbers or numeric strings, dates may be
//! calendar dates or timestamps. All of that is decoded here, once, into
//! [`Order`]s.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use time::UtcOffset;
use tracing::{debug, warn};

use crate::engine::{BookingStore, InMemoryCatalog, StoreError};
use crate::model::*;
use crate::request::{parse_calendar_date, parse_id};

#[derive(Debug, Deserialize)]
struct RawOrders {
    #[serde(default)]
    orders: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    products: Vec<Value>,
}

/// Order body, decoded only once the order's status is known to matter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrder {
    #[serde(default, alias = "project_name")]
    project_name: Option<String>,
    #[serde(default, alias = "start_date")]
    start_date: Option<String>,
    #[serde(default, alias = "end_date")]
    end_date: Option<String>,
    #[serde(default, alias = "reserved_items")]
    reserved_items: Value,
    #[serde(default, alias = "customer_name")]
    customer_name: Option<String>,
    #[serde(default, alias = "customer_email")]
    customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    price: Option<Value>,
}

/// Decode the export's orders whose status is in `statuses`.
///
/// Every row's id and status are read first; rows in other statuses are
/// skipped without touching their dates or reserved items. A row in a
/// requested status that cannot be strongly typed fails the whole call: the
/// engine never works from a partial set of active orders. An unknown status
/// counts as undecodable.
pub fn decode_orders(
    bytes: &[u8],
    statuses: &[OrderStatus],
    offset: UtcOffset,
) -> Result<Vec<Order>, StoreError> {
    let raw: RawOrders = serde_json::from_slice(bytes).map_err(|e| StoreError::Malformed {
        order_id: None,
        reason: e.to_string(),
    })?;
    let mut orders = Vec::new();
    for entry in raw.orders {
        let (id, status) = order_header(&entry)?;
        if statuses.contains(&status) {
            orders.push(decode_order(id, status, entry, offset)?);
        }
    }
    Ok(orders)
}

fn order_header(entry: &Value) -> Result<(OrderId, OrderStatus), StoreError> {
    let id = match entry.get("id") {
        Some(v) => parse_id(v).ok_or_else(|| StoreError::Malformed {
            order_id: None,
            reason: format!("order id {v} is not an integer"),
        })?,
        None => {
            return Err(StoreError::Malformed {
                order_id: None,
                reason: "order without an id".to_string(),
            });
        }
    };
    let status = match entry.get("status") {
        Some(Value::String(s)) => OrderStatus::parse(s),
        _ => None,
    }
    .ok_or_else(|| StoreError::Malformed {
        order_id: Some(id),
        reason: match entry.get("status") {
            Some(v) => format!("unknown status {v}"),
            None => "missing status".to_string(),
        },
    })?;
    Ok((id, status))
}

fn decode_order(
    id: OrderId,
    status: OrderStatus,
    entry: Value,
    offset: UtcOffset,
) -> Result<Order, StoreError> {
    let malformed = |reason: String| StoreError::Malformed {
        order_id: Some(id),
        reason,
    };
    let raw: RawOrder = serde_json::from_value(entry).map_err(|e| malformed(e.to_string()))?;

    let start = optional_date(raw.start_date.as_deref(), offset)
        .map_err(|s| malformed(format!("startDate {s:?} is not a date")))?;
    let end = optional_date(raw.end_date.as_deref(), offset)
        .map_err(|s| malformed(format!("endDate {s:?} is not a date")))?;
    let dates = match (start, end) {
        (Some(s), Some(e)) => Some(
            DateRange::try_new(s, e)
                .ok_or_else(|| malformed(format!("startDate {s} is after endDate {e}")))?,
        ),
        _ => None,
    };

    let reserved_items = decode_reserved_items(&raw.reserved_items).map_err(malformed)?;

    Ok(Order {
        id,
        project_name: raw.project_name.unwrap_or_default(),
        status,
        dates,
        reserved_items,
        customer_name: raw.customer_name.unwrap_or_default(),
        customer_email: raw.customer_email.unwrap_or_default(),
    })
}

/// `Ok(None)` for a missing or blank date, `Err(raw)` for an unparsable one.
fn optional_date(raw: Option<&str>, offset: UtcOffset) -> Result<Option<time::Date>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_calendar_date(s, offset)
            .map(Some)
            .ok_or_else(|| s.to_string()),
    }
}

/// Reserved items arrive as an array of objects, a string holding such an
/// array, or nothing at all.
pub(crate) fn decode_reserved_items(v: &Value) -> Result<Vec<ReservedItem>, String> {
    match v {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => {
            let inner: Value = serde_json::from_str(s)
                .map_err(|e| format!("reserved items string is not JSON: {e}"))?;
            match inner {
                Value::Array(items) => decode_item_list(&items),
                Value::Null => Ok(Vec::new()),
                _ => Err("reserved items string does not hold a list".to_string()),
            }
        }
        Value::Array(items) => decode_item_list(items),
        other => Err(format!("reserved items must be a list, got {other}")),
    }
}

fn decode_item_list(items: &[Value]) -> Result<Vec<ReservedItem>, String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(fields) => decode_item(fields).map_err(|e| format!("reserved item {i}: {e}")),
            other => Err(format!("reserved item {i} is not an object: {other}")),
        })
        .collect()
}

fn decode_item(fields: &Map<String, Value>) -> Result<ReservedItem, String> {
    let id_value = first_field(fields, &["productId", "product_id", "id"])
        .ok_or_else(|| "missing product id".to_string())?;
    let product_id = parse_id(id_value)
        .filter(|id| *id > 0)
        .ok_or_else(|| format!("product id {id_value} is not a positive integer"))?;

    let product_name = match first_field(fields, &["productName", "product_name", "name"]) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let quantity = match first_field(fields, &["quantity", "qty"]) {
        None | Some(Value::Null) => 1,
        Some(q) => parse_id(q)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| format!("quantity {q} is not a non-negative integer"))?,
    };

    Ok(ReservedItem {
        product_id,
        product_name,
        quantity,
    })
}

fn first_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fields.get(*k))
}

/// Decode the export's product rows. Product metadata is decorative, so a
/// bad row is logged and skipped; only an unreadable document fails.
pub fn decode_products(bytes: &[u8]) -> Result<Vec<ProductMeta>, StoreError> {
    let raw: RawCatalog = serde_json::from_slice(bytes).map_err(|e| StoreError::Malformed {
        order_id: None,
        reason: e.to_string(),
    })?;
    let mut products = Vec::with_capacity(raw.products.len());
    for (i, entry) in raw.products.into_iter().enumerate() {
        match serde_json::from_value::<RawProduct>(entry)
            .map_err(|e| e.to_string())
            .and_then(decode_product)
        {
            Ok(product) => products.push(product),
            Err(e) => warn!("skipping product row {i}: {e}"),
        }
    }
    Ok(products)
}

fn decode_product(raw: RawProduct) -> Result<ProductMeta, String> {
    let id = parse_id(&raw.id).ok_or_else(|| format!("product id {} is not an integer", raw.id))?;
    let price = match raw.price {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(ProductMeta {
        id,
        name: raw.name.unwrap_or_default(),
        sku: raw.sku.unwrap_or_default(),
        image: raw.image.unwrap_or_default(),
        price,
    })
}

async fn read_export(path: &Path) -> Result<Vec<u8>, StoreError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))
}

// ── Store ────────────────────────────────────────────────────────

/// Booking store over an export file. The file is re-read on every query so
/// each scan sees the latest export. Only the `orders` section is consulted.
pub struct SnapshotStore {
    path: PathBuf,
    offset: UtcOffset,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, offset: UtcOffset) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BookingStore for SnapshotStore {
    async fn dated_orders(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, StoreError> {
        let bytes = read_export(&self.path).await?;
        let decoded = decode_orders(&bytes, statuses, self.offset)?;
        let total = decoded.len();
        let orders: Vec<Order> = decoded.into_iter().filter(|o| o.dates.is_some()).collect();
        debug!(
            "read {} ({} orders in requested statuses, {} dated)",
            self.path.display(),
            total,
            orders.len()
        );
        Ok(orders)
    }
}

/// Build a catalog from the export's `products` section.
pub async fn load_catalog(path: &Path) -> Result<InMemoryCatalog, StoreError> {
    let bytes = read_export(path).await?;
    let catalog = InMemoryCatalog::new();
    for product in decode_products(&bytes)? {
        catalog.insert(product);
    }
    Ok(catalog)
}
