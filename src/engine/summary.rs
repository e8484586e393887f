use std::collections::BTreeSet;

use crate::model::*;

use super::overlap::rounded_div;

/// Roll a list of conflicts up into one caller-facing verdict.
pub fn summarize(conflicts: &[ConflictRecord]) -> ConflictSummary {
    let conflicting_orders: BTreeSet<OrderId> = conflicts.iter().map(|c| c.order_id).collect();
    let conflicting_products: BTreeSet<ProductId> = conflicts
        .iter()
        .flat_map(|c| c.conflicting_products.iter().map(|p| p.product_id))
        .collect();

    let severity_level = conflicts
        .iter()
        .map(|c| SeverityLevel::from(c.conflict_severity))
        .max()
        .unwrap_or(SeverityLevel::None);

    let critical_conflicts = count_severity(conflicts, ConflictSeverity::Critical);
    let high_conflicts = count_severity(conflicts, ConflictSeverity::High);

    let average_overlap_percentage = if conflicts.is_empty() {
        0
    } else {
        let total: i64 = conflicts.iter().map(|c| c.overlap_percentage as i64).sum();
        rounded_div(total, conflicts.len() as i64) as u8
    };

    let can_be_resolved = conflicts.iter().all(|c| {
        c.resolution_suggestions.can_reschedule || c.resolution_suggestions.can_share_equipment
    });

    ConflictSummary {
        total_conflicts: conflicts.len(),
        conflicting_orders: conflicting_orders.into_iter().collect(),
        conflicting_products: conflicting_products.into_iter().collect(),
        severity_level,
        impact_analysis: ImpactAnalysis {
            critical_conflicts,
            high_conflicts,
            average_overlap_percentage,
            requires_immediate_attention: critical_conflicts > 0 || high_conflicts > 0,
            can_be_resolved,
        },
        recommendations: recommend(severity_level),
    }
}

fn count_severity(conflicts: &[ConflictRecord], severity: ConflictSeverity) -> usize {
    conflicts
        .iter()
        .filter(|c| c.conflict_severity == severity)
        .count()
}

fn recommend(level: SeverityLevel) -> Recommendations {
    let (primary_action, urgency_level) = match level {
        SeverityLevel::None => (PrimaryAction::None, UrgencyLevel::Normal),
        SeverityLevel::Critical => (PrimaryAction::RescheduleRequired, UrgencyLevel::Immediate),
        SeverityLevel::High => (PrimaryAction::CoordinationRequired, UrgencyLevel::High),
        SeverityLevel::Medium | SeverityLevel::Low => {
            (PrimaryAction::MonitoringRecommended, UrgencyLevel::Normal)
        }
    };
    Recommendations {
        primary_action,
        urgency_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::{severity_for, suggest_resolution};
    use time::macros::date;

    fn record(order_id: OrderId, pct: u8, products: &[ProductId]) -> ConflictRecord {
        let candidate = DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 19));
        ConflictRecord {
            order_id,
            order_project: String::new(),
            status: OrderStatus::Processing,
            customer_name: String::new(),
            customer_email: String::new(),
            candidate_range: candidate,
            conflicting_range: candidate,
            overlap_days: 1,
            overlap_percentage: pct,
            conflict_severity: severity_for(pct),
            conflicting_products: products
                .iter()
                .map(|&product_id| ConflictingProduct {
                    product_id,
                    product_name: String::new(),
                    sku: String::new(),
                    image: String::new(),
                    quantity: 1,
                    conflict_type: ConflictType::Partial,
                    availability_status: AvailabilityStatus::PartiallyAvailable,
                })
                .collect(),
            resolution_suggestions: suggest_resolution(&candidate, pct, products.len()),
        }
    }

    #[test]
    fn empty_list_means_no_action() {
        let s = summarize(&[]);
        assert_eq!(s.total_conflicts, 0);
        assert_eq!(s.severity_level, SeverityLevel::None);
        assert_eq!(s.impact_analysis.average_overlap_percentage, 0);
        assert!(!s.impact_analysis.requires_immediate_attention);
        assert!(s.impact_analysis.can_be_resolved);
        assert_eq!(s.recommendations.primary_action, PrimaryAction::None);
        assert_eq!(s.recommendations.urgency_level, UrgencyLevel::Normal);
    }

    #[test]
    fn any_full_overlap_is_critical() {
        let s = summarize(&[record(1, 10, &[1]), record(2, 100, &[2]), record(3, 55, &[3])]);
        assert_eq!(s.severity_level, SeverityLevel::Critical);
        assert_eq!(s.impact_analysis.critical_conflicts, 1);
        assert!(s.impact_analysis.requires_immediate_attention);
        assert_eq!(s.recommendations.primary_action, PrimaryAction::RescheduleRequired);
        assert_eq!(s.recommendations.urgency_level, UrgencyLevel::Immediate);
        // 100% cannot reschedule, and sharing needs < 50%
        assert!(!s.impact_analysis.can_be_resolved);
    }

    #[test]
    fn high_without_critical_needs_coordination() {
        let s = summarize(&[record(1, 80, &[1]), record(2, 30, &[1])]);
        assert_eq!(s.severity_level, SeverityLevel::High);
        assert_eq!(s.impact_analysis.high_conflicts, 1);
        assert_eq!(s.recommendations.primary_action, PrimaryAction::CoordinationRequired);
        assert_eq!(s.recommendations.urgency_level, UrgencyLevel::High);
        assert!(s.impact_analysis.can_be_resolved);
    }

    #[test]
    fn minor_conflicts_are_monitored() {
        let s = summarize(&[record(1, 20, &[1]), record(2, 60, &[2])]);
        assert_eq!(s.severity_level, SeverityLevel::Medium);
        assert!(!s.impact_analysis.requires_immediate_attention);
        assert_eq!(s.recommendations.primary_action, PrimaryAction::MonitoringRecommended);
        assert_eq!(s.recommendations.urgency_level, UrgencyLevel::Normal);
        assert_eq!(s.impact_analysis.average_overlap_percentage, 40);
    }

    #[test]
    fn distinct_orders_and_products() {
        let s = summarize(&[record(9, 20, &[3, 1]), record(4, 20, &[1]), record(9, 30, &[2])]);
        assert_eq!(s.total_conflicts, 3);
        assert_eq!(s.conflicting_orders, vec![4, 9]);
        assert_eq!(s.conflicting_products, vec![1, 2, 3]);
    }

    #[test]
    fn average_rounds_half_up() {
        let s = summarize(&[record(1, 10, &[1]), record(2, 11, &[1])]);
        assert_eq!(s.impact_analysis.average_overlap_percentage, 11);
    }
}
