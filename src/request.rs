use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::engine::{EngineError, Violation};
use crate::limits::*;
use crate::model::*;

/// A validated conflict-check request. Only constructible through
/// [`BookingRequest::new`] or [`RawBookingRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    exclude_order_id: OrderId,
    product_ids: BTreeSet<ProductId>,
    range: DateRange,
}

impl BookingRequest {
    /// `exclude_order_id` is the order being edited; pass 0 for a new order.
    pub fn new(
        exclude_order_id: OrderId,
        product_ids: impl IntoIterator<Item = ProductId>,
        start: Date,
        end: Date,
    ) -> Result<Self, EngineError> {
        let mut violations = Vec::new();
        if exclude_order_id < 0 {
            violations.push(Violation::new(
                "excludeOrderId",
                "must be a non-negative integer",
            ));
        }

        let mut ids = BTreeSet::new();
        for id in product_ids {
            if id <= 0 {
                violations.push(Violation::new(
                    "productIds",
                    format!("{id} is not a positive integer"),
                ));
            } else {
                ids.insert(id);
            }
        }
        check_product_count(ids.len(), &mut violations);

        let range = check_range(start, end, &mut violations);
        match range {
            Some(range) if violations.is_empty() => Ok(Self {
                exclude_order_id,
                product_ids: ids,
                range,
            }),
            _ => Err(EngineError::Validation(violations)),
        }
    }

    pub fn exclude_order_id(&self) -> OrderId {
        self.exclude_order_id
    }

    pub fn product_ids(&self) -> &BTreeSet<ProductId> {
        &self.product_ids
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

fn check_product_count(count: usize, violations: &mut Vec<Violation>) {
    if count == 0 && violations.iter().all(|v| v.field != "productIds") {
        violations.push(Violation::new("productIds", "must not be empty"));
    }
    if count > MAX_PRODUCT_IDS_PER_REQUEST {
        violations.push(Violation::new(
            "productIds",
            format!("at most {MAX_PRODUCT_IDS_PER_REQUEST} products per check"),
        ));
    }
}

fn check_range(start: Date, end: Date, violations: &mut Vec<Violation>) -> Option<DateRange> {
    let Some(range) = DateRange::try_new(start, end) else {
        violations.push(Violation::new(
            "dateRange",
            format!("startDate {start} is after endDate {end}"),
        ));
        return None;
    };
    if range.days() > MAX_RANGE_DAYS {
        violations.push(Violation::new(
            "dateRange",
            format!("longer than {MAX_RANGE_DAYS} days"),
        ));
        return None;
    }
    Some(range)
}

// ── Loose input ──────────────────────────────────────────────────

/// Request as sent by a web caller: ids may be numbers or numeric strings,
/// dates may be calendar dates or full timestamps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBookingRequest {
    #[serde(default, alias = "exclude_order_id")]
    pub exclude_order_id: Option<Value>,
    #[serde(default, alias = "product_ids")]
    pub product_ids: Option<Value>,
    #[serde(default, alias = "start_date")]
    pub start_date: Option<Value>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<Value>,
}

impl RawBookingRequest {
    /// Decode and validate, reporting every offending field at once.
    /// Timestamps are truncated to their calendar date in `offset`.
    pub fn validate(&self, offset: UtcOffset) -> Result<BookingRequest, EngineError> {
        let mut violations = Vec::new();

        let exclude = match &self.exclude_order_id {
            None | Some(Value::Null) => {
                violations.push(Violation::new("excludeOrderId", "is required"));
                None
            }
            Some(v) => match parse_id(v) {
                Some(id) if id >= 0 => Some(id),
                _ => {
                    violations.push(Violation::new(
                        "excludeOrderId",
                        format!("{v} is not a non-negative integer"),
                    ));
                    None
                }
            },
        };

        let mut ids = BTreeSet::new();
        match &self.product_ids {
            None | Some(Value::Null) => {
                violations.push(Violation::new("productIds", "is required"));
            }
            Some(v) => {
                for entry in id_entries(v) {
                    match parse_id(&entry) {
                        Some(id) if id > 0 => {
                            ids.insert(id);
                        }
                        _ => violations.push(Violation::new(
                            "productIds",
                            format!("{entry} is not a positive integer"),
                        )),
                    }
                }
                check_product_count(ids.len(), &mut violations);
            }
        }

        let start = required_date("startDate", self.start_date.as_ref(), offset, &mut violations);
        let end = required_date("endDate", self.end_date.as_ref(), offset, &mut violations);
        let range = match (start, end) {
            (Some(s), Some(e)) => check_range(s, e, &mut violations),
            _ => None,
        };

        match (exclude, range) {
            (Some(exclude_order_id), Some(range)) if violations.is_empty() => Ok(BookingRequest {
                exclude_order_id,
                product_ids: ids,
                range,
            }),
            _ => Err(EngineError::Validation(violations)),
        }
    }
}

/// Product ids arrive as an array or as a comma-separated string.
fn id_entries(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect(),
        other => vec![other.clone()],
    }
}

fn required_date(
    field: &'static str,
    raw: Option<&Value>,
    offset: UtcOffset,
    violations: &mut Vec<Violation>,
) -> Option<Date> {
    let s = match raw {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.trim(),
        Some(other) => {
            violations.push(Violation::new(field, format!("{other} is not a date string")));
            return None;
        }
    };
    if s.is_empty() {
        violations.push(Violation::new(field, "is required"));
        return None;
    }
    let parsed = parse_calendar_date(s, offset);
    if parsed.is_none() {
        violations.push(Violation::new(field, format!("{s:?} is not a valid date")));
    }
    parsed
}

// ── Shared decoding helpers ──────────────────────────────────────

/// Integer id from a JSON number or numeric string.
pub(crate) fn parse_id(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp (converted to
/// `offset` first), or a `YYYY-MM-DD HH:MM:SS` local timestamp.
pub(crate) fn parse_calendar_date(raw: &str, offset: UtcOffset) -> Option<Date> {
    let s = raw.trim();
    if let Ok(d) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Some(d);
    }
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(ts.to_offset(offset).date());
    }
    PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .ok()
        .map(|dt| dt.date())
}
