use std::collections::{BTreeMap, HashSet};

use crate::model::*;
use crate::request::BookingRequest;

use super::classify::{classify_product, severity_for, suggest_resolution};
use super::overlap::overlap;

/// Scan `orders` for bookings that hold any requested product during the
/// requested window. Emits at most one record per conflicting order.
///
/// Orders that are inactive, undated, excluded by the request, disjoint in
/// time, or share no product are skipped. Catalog fields (`sku`, `image`)
/// are left empty; the engine fills them in.
pub fn find_conflicts(request: &BookingRequest, orders: &[Order]) -> Vec<ConflictRecord> {
    let candidate = request.range();
    let mut seen: HashSet<OrderId> = HashSet::new();
    let mut records = Vec::new();

    for order in orders {
        if order.id == request.exclude_order_id() || !order.status.is_active() {
            continue;
        }
        let Some(other) = order.dates else { continue };
        if !candidate.overlaps(&other) {
            continue;
        }

        let shared = shared_products(request, order);
        if shared.is_empty() {
            continue;
        }
        if !seen.insert(order.id) {
            continue;
        }

        let ov = overlap(&candidate, &other);
        let (conflict_type, availability_status) = classify_product(ov.percentage);
        let conflicting_products: Vec<ConflictingProduct> = shared
            .into_iter()
            .map(|(product_id, (product_name, quantity))| ConflictingProduct {
                product_id,
                product_name,
                sku: String::new(),
                image: String::new(),
                quantity,
                conflict_type,
                availability_status,
            })
            .collect();

        let resolution_suggestions =
            suggest_resolution(&candidate, ov.percentage, conflicting_products.len());

        records.push(ConflictRecord {
            order_id: order.id,
            order_project: order.project_name.clone(),
            status: order.status,
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            candidate_range: candidate,
            conflicting_range: other,
            overlap_days: ov.days,
            overlap_percentage: ov.percentage,
            conflict_severity: severity_for(ov.percentage),
            conflicting_products,
            resolution_suggestions,
        });
    }

    sort_for_presentation(&mut records);
    records
}

/// Requested products the order also reserves, keyed by product id.
/// Repeated lines for one product are merged and their quantities summed.
fn shared_products(request: &BookingRequest, order: &Order) -> BTreeMap<ProductId, (String, u32)> {
    let mut shared: BTreeMap<ProductId, (String, u32)> = BTreeMap::new();
    for item in &order.reserved_items {
        if !request.product_ids().contains(&item.product_id) {
            continue;
        }
        let entry = shared
            .entry(item.product_id)
            .or_insert_with(|| (item.product_name.clone(), 0));
        entry.1 = entry.1.saturating_add(item.quantity);
    }
    shared
}

/// Most severe first, then by order id so output is stable.
pub(crate) fn sort_for_presentation(records: &mut [ConflictRecord]) {
    records.sort_by(|a, b| {
        b.conflict_severity
            .cmp(&a.conflict_severity)
            .then(a.order_id.cmp(&b.order_id))
    });
}
