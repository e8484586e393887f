use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

pub type OrderId = i64;
pub type ProductId = i64;

/// Inclusive calendar-day range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        debug_assert!(start <= end, "DateRange start must not be after end");
        Self { start, end }
    }

    /// `None` when the range is inverted.
    pub fn try_new(start: Date, end: Date) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        DateRange::try_new(self.start.max(other.start), self.end.min(other.end))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Commerce order status. Only [`OrderStatus::ACTIVE`] statuses hold equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub const ACTIVE: [OrderStatus; 3] = [
        OrderStatus::Processing,
        OrderStatus::OnHold,
        OrderStatus::Completed,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }

    /// Lenient parse: case-insensitive, accepts `_` for `-` and a `wc-` prefix.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase().replace('_', "-");
        let name = lowered.strip_prefix("wc-").unwrap_or(&lowered);
        match name {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "on-hold" => Some(OrderStatus::OnHold),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            "failed" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of equipment reserved by an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
}

/// A rental order as read from the booking store. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub project_name: String,
    pub status: OrderStatus,
    /// `None` when either date is missing; such orders never conflict.
    pub dates: Option<DateRange>,
    pub reserved_items: Vec<ReservedItem>,
    pub customer_name: String,
    pub customer_email: String,
}

/// Decorative product metadata from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMeta {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Option<f64>,
}

// ── Conflict results ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Full,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Unavailable,
    RequiresCoordination,
    PartiallyAvailable,
}

/// Four-tier severity. Variant order is the severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConflictSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictSeverity::Low => "low",
            ConflictSeverity::Medium => "medium",
            ConflictSeverity::High => "high",
            ConflictSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub image: String,
    /// Quantity held by the conflicting order.
    pub quantity: u32,
    pub conflict_type: ConflictType,
    pub availability_status: AvailabilityStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSuggestions {
    pub can_reschedule: bool,
    pub can_share_equipment: bool,
    pub contact_required: bool,
    pub priority: Priority,
    /// Unvalidated suggestions, only offered above 50% overlap.
    pub alternative_dates: Vec<DateRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub order_id: OrderId,
    pub order_project: String,
    pub status: OrderStatus,
    pub customer_name: String,
    pub customer_email: String,
    pub candidate_range: DateRange,
    pub conflicting_range: DateRange,
    pub overlap_days: i64,
    /// Relative to the candidate's range, rounded, 0..=100.
    pub overlap_percentage: u8,
    pub conflict_severity: ConflictSeverity,
    pub conflicting_products: Vec<ConflictingProduct>,
    pub resolution_suggestions: ResolutionSuggestions,
}

// ── Summary ──────────────────────────────────────────────────────

/// Overall verdict severity; `None` when nothing conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl From<ConflictSeverity> for SeverityLevel {
    fn from(s: ConflictSeverity) -> Self {
        match s {
            ConflictSeverity::Low => SeverityLevel::Low,
            ConflictSeverity::Medium => SeverityLevel::Medium,
            ConflictSeverity::High => SeverityLevel::High,
            ConflictSeverity::Critical => SeverityLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    None,
    RescheduleRequired,
    CoordinationRequired,
    MonitoringRecommended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Immediate,
    High,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub critical_conflicts: usize,
    pub high_conflicts: usize,
    pub average_overlap_percentage: u8,
    pub requires_immediate_attention: bool,
    pub can_be_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub primary_action: PrimaryAction,
    pub urgency_level: UrgencyLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSummary {
    pub total_conflicts: usize,
    /// Distinct, ascending.
    pub conflicting_orders: Vec<OrderId>,
    /// Distinct, ascending.
    pub conflicting_products: Vec<ProductId>,
    pub severity_level: SeverityLevel,
    pub impact_analysis: ImpactAnalysis,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub conflicts: Vec<ConflictRecord>,
    pub summary: ConflictSummary,
}

// ── Equipment in the field ───────────────────────────────────────

/// Return urgency of rented equipment, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnBucket {
    Expired,
    Critical,
    Warning,
    Active,
}

impl ReturnBucket {
    pub const ALL: [ReturnBucket; 4] = [
        ReturnBucket::Expired,
        ReturnBucket::Critical,
        ReturnBucket::Warning,
        ReturnBucket::Active,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnBucket::Expired => "expired",
            ReturnBucket::Critical => "critical",
            ReturnBucket::Warning => "warning",
            ReturnBucket::Active => "active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInField {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    pub order_id: OrderId,
    pub order_project: String,
    pub end_date: Date,
    pub status: OrderStatus,
    /// Negative when the return date has passed.
    pub days_remaining: i64,
    pub bucket: ReturnBucket,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub expired: usize,
    pub critical: usize,
    pub warning: usize,
    pub active: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: ReturnBucket) -> usize {
        match bucket {
            ReturnBucket::Expired => self.expired,
            ReturnBucket::Critical => self.critical,
            ReturnBucket::Warning => self.warning,
            ReturnBucket::Active => self.active,
        }
    }

    pub fn total(&self) -> usize {
        self.expired + self.critical + self.warning + self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub as_of: Date,
    pub rows: Vec<EquipmentInField>,
    pub counts: BucketCounts,
}
