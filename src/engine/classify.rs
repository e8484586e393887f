use time::Duration;

use crate::limits::ALTERNATIVE_WINDOW_GAP_DAYS;
use crate::model::*;

// ── Severity & resolution ─────────────────────────────────────────
//
// Thresholds are inclusive on the upper tier: 100 is full, 51..=99 needs
// coordination, anything at or below 50 is partial.

pub fn severity_for(overlap_percentage: u8) -> ConflictSeverity {
    match overlap_percentage {
        100.. => ConflictSeverity::Critical,
        76..=99 => ConflictSeverity::High,
        51..=75 => ConflictSeverity::Medium,
        _ => ConflictSeverity::Low,
    }
}

/// Per-product tags. Depends only on the record's overlap percentage.
pub fn classify_product(overlap_percentage: u8) -> (ConflictType, AvailabilityStatus) {
    match overlap_percentage {
        100.. => (ConflictType::Full, AvailabilityStatus::Unavailable),
        51..=99 => (ConflictType::Partial, AvailabilityStatus::RequiresCoordination),
        _ => (ConflictType::Partial, AvailabilityStatus::PartiallyAvailable),
    }
}

pub fn priority_for(overlap_percentage: u8) -> Priority {
    if overlap_percentage > 75 {
        Priority::High
    } else if overlap_percentage > 50 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Heuristic hints for human follow-up on one conflict record.
pub fn suggest_resolution(
    candidate: &DateRange,
    overlap_percentage: u8,
    conflicting_products: usize,
) -> ResolutionSuggestions {
    let alternative_dates = if overlap_percentage > 50 {
        alternative_windows(candidate)
    } else {
        Vec::new()
    };
    ResolutionSuggestions {
        can_reschedule: overlap_percentage < 100,
        can_share_equipment: overlap_percentage < 50 && conflicting_products == 1,
        contact_required: overlap_percentage > 25,
        priority: priority_for(overlap_percentage),
        alternative_dates,
    }
}

/// Same-length windows ending a week before the candidate starts and
/// starting a week after it ends. Not checked against other bookings.
/// A window that would fall outside the representable calendar is omitted.
pub fn alternative_windows(candidate: &DateRange) -> Vec<DateRange> {
    let gap = Duration::days(ALTERNATIVE_WINDOW_GAP_DAYS);
    let extra = Duration::days(candidate.days() - 1);

    let before = candidate.start.checked_sub(gap).and_then(|end| {
        let start = end.checked_sub(extra)?;
        Some(DateRange::new(start, end))
    });
    let after = candidate.end.checked_add(gap).and_then(|start| {
        let end = start.checked_add(extra)?;
        Some(DateRange::new(start, end))
    });

    before.into_iter().chain(after).collect()
}
