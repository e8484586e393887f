use time::{Date, Duration};

use crate::model::*;

// ── Equipment in the field ────────────────────────────────────────

/// Return urgency for equipment due back in `days_remaining` days.
pub fn bucket_for(days_remaining: i64) -> ReturnBucket {
    match days_remaining {
        i64::MIN..=-1 => ReturnBucket::Expired,
        0..=3 => ReturnBucket::Critical,
        4..=7 => ReturnBucket::Warning,
        _ => ReturnBucket::Active,
    }
}

/// Whole days from `as_of` until `end`; negative once `end` has passed.
pub fn days_remaining(end: Date, as_of: Date) -> i64 {
    (end - as_of).whole_days()
}

/// First return date still tracked when looking `lookback_days` into the past.
pub fn tracking_cutoff(as_of: Date, lookback_days: u32) -> Date {
    as_of
        .checked_sub(Duration::days(lookback_days as i64))
        .unwrap_or(Date::MIN)
}

/// Expand active orders still out on `as_of` into one row per reserved line,
/// most urgent return first.
///
/// Orders whose return date is before `as_of - lookback_days` are dropped.
/// Rows that remain with a past return date are kept and tagged
/// [`ReturnBucket::Expired`]. `product_image` is left empty for the engine
/// to fill in.
pub fn equipment_in_field(orders: &[Order], as_of: Date, lookback_days: u32) -> Vec<EquipmentInField> {
    let cutoff = tracking_cutoff(as_of, lookback_days);
    let mut rows = Vec::new();

    for order in orders {
        if !order.status.is_active() {
            continue;
        }
        let Some(dates) = order.dates else { continue };
        if dates.end < cutoff {
            continue;
        }
        let days = days_remaining(dates.end, as_of);
        let bucket = bucket_for(days);
        for item in &order.reserved_items {
            rows.push(EquipmentInField {
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                product_image: String::new(),
                quantity: item.quantity,
                order_id: order.id,
                order_project: order.project_name.clone(),
                end_date: dates.end,
                status: order.status,
                days_remaining: days,
                bucket,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then(a.order_id.cmp(&b.order_id))
            .then(a.product_id.cmp(&b.product_id))
    });
    rows
}

pub fn count_buckets(rows: &[EquipmentInField]) -> BucketCounts {
    let mut counts = BucketCounts::default();
    for row in rows {
        match row.bucket {
            ReturnBucket::Expired => counts.expired += 1,
            ReturnBucket::Critical => counts.critical += 1,
            ReturnBucket::Warning => counts.warning += 1,
            ReturnBucket::Active => counts.active += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn order(id: OrderId, status: OrderStatus, start: Date, end: Date, items: &[ProductId]) -> Order {
        Order {
            id,
            project_name: format!("shoot {id}"),
            status,
            dates: Some(DateRange::new(start, end)),
            reserved_items: items
                .iter()
                .map(|&product_id| ReservedItem {
                    product_id,
                    product_name: format!("item {product_id}"),
                    quantity: 1,
                })
                .collect(),
            customer_name: String::new(),
            customer_email: String::new(),
        }
    }

    // ── buckets ──────────────────────────────────────────

    #[test]
    fn bucket_boundaries() {
        assert_eq!(bucket_for(-1), ReturnBucket::Expired);
        assert_eq!(bucket_for(0), ReturnBucket::Critical);
        assert_eq!(bucket_for(3), ReturnBucket::Critical);
        assert_eq!(bucket_for(4), ReturnBucket::Warning);
        assert_eq!(bucket_for(7), ReturnBucket::Warning);
        assert_eq!(bucket_for(8), ReturnBucket::Active);
        assert_eq!(bucket_for(i64::MIN), ReturnBucket::Expired);
    }

    #[test]
    fn days_remaining_signed() {
        let today = date!(2024 - 06 - 10);
        assert_eq!(days_remaining(date!(2024 - 06 - 13), today), 3);
        assert_eq!(days_remaining(today, today), 0);
        assert_eq!(days_remaining(date!(2024 - 06 - 09), today), -1);
    }

    // ── expansion ────────────────────────────────────────

    #[test]
    fn one_row_per_reserved_line() {
        let today = date!(2024 - 06 - 10);
        let orders = vec![order(1, OrderStatus::Processing, date!(2024 - 06 - 01), date!(2024 - 06 - 20), &[5, 6, 7])];
        let rows = equipment_in_field(&orders, today, 0);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.days_remaining == 10 && r.bucket == ReturnBucket::Active));
        assert_eq!(rows[0].order_project, "shoot 1");
    }

    #[test]
    fn returned_and_inactive_orders_are_not_in_field() {
        let today = date!(2024 - 06 - 10);
        let orders = vec![
            order(1, OrderStatus::Completed, date!(2024 - 06 - 01), date!(2024 - 06 - 09), &[5]),
            order(2, OrderStatus::Cancelled, date!(2024 - 06 - 01), date!(2024 - 06 - 20), &[5]),
            order(3, OrderStatus::Pending, date!(2024 - 06 - 01), date!(2024 - 06 - 20), &[5]),
            order(4, OrderStatus::OnHold, date!(2024 - 06 - 01), date!(2024 - 06 - 10), &[5]),
        ];
        let rows = equipment_in_field(&orders, today, 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_id, 4);
        assert_eq!(rows[0].days_remaining, 0);
        assert_eq!(rows[0].bucket, ReturnBucket::Critical);
    }

    #[test]
    fn lookback_keeps_overdue_visible() {
        let today = date!(2024 - 06 - 10);
        let orders = vec![
            order(1, OrderStatus::Processing, date!(2024 - 06 - 01), date!(2024 - 06 - 09), &[5]),
            order(2, OrderStatus::Processing, date!(2024 - 05 - 01), date!(2024 - 05 - 20), &[5]),
        ];
        let rows = equipment_in_field(&orders, today, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_id, 1);
        assert_eq!(rows[0].days_remaining, -1);
        assert_eq!(rows[0].bucket, ReturnBucket::Expired);
    }

    #[test]
    fn sorted_most_urgent_first() {
        let today = date!(2024 - 06 - 10);
        let orders = vec![
            order(1, OrderStatus::Processing, today, date!(2024 - 06 - 30), &[1]),
            order(2, OrderStatus::Processing, today, date!(2024 - 06 - 12), &[2, 1]),
            order(3, OrderStatus::Completed, today, date!(2024 - 06 - 16), &[3]),
        ];
        let rows = equipment_in_field(&orders, today, 0);
        let got: Vec<_> = rows.iter().map(|r| (r.order_id, r.product_id, r.bucket)).collect();
        assert_eq!(
            got,
            vec![
                (2, 1, ReturnBucket::Critical),
                (2, 2, ReturnBucket::Critical),
                (3, 3, ReturnBucket::Warning),
                (1, 1, ReturnBucket::Active),
            ]
        );
        let counts = count_buckets(&rows);
        assert_eq!(counts.critical, 2);
        assert_eq!(counts.warning, 1);
        assert_eq!(counts.active, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn cutoff_saturates_at_calendar_start() {
        assert_eq!(tracking_cutoff(Date::MIN, 5), Date::MIN);
    }
}
