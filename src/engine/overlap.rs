use crate::model::DateRange;

// ── Interval overlap ──────────────────────────────────────────────

/// Overlap of two inclusive date ranges, measured against a reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    /// Shared calendar days, both ends included. 0 when disjoint.
    pub days: i64,
    /// `days` as a rounded percentage of the reference range's length.
    pub percentage: u8,
}

impl Overlap {
    pub const NONE: Overlap = Overlap {
        days: 0,
        percentage: 0,
    };
}

/// Compute how much of `reference` is covered by `other`.
///
/// Asymmetric on purpose: the same shared days give a different percentage
/// depending on which side is the reference. Callers pass the candidate
/// booking as `reference`.
pub fn overlap(reference: &DateRange, other: &DateRange) -> Overlap {
    match reference.intersection(other) {
        Some(shared) => {
            let days = shared.days();
            Overlap {
                days,
                percentage: rounded_percent(days, reference.days()),
            }
        }
        None => Overlap::NONE,
    }
}

/// `round(part / whole * 100)`, halves rounded up, clamped to 0..=100.
pub fn rounded_percent(part: i64, whole: i64) -> u8 {
    if whole <= 0 || part <= 0 {
        return 0;
    }
    rounded_div(part * 100, whole).clamp(0, 100) as u8
}

/// Integer division of non-negative values rounding halves up.
pub(crate) fn rounded_div(num: i64, den: i64) -> i64 {
    (2 * num + den) / (2 * den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn range(start: time::Date, end: time::Date) -> DateRange {
        DateRange::new(start, end)
    }

    #[test]
    fn overlap_detected_both_ways() {
        let a = range(date!(2024 - 01 - 10), date!(2024 - 01 - 20));
        let b = range(date!(2024 - 01 - 15), date!(2024 - 01 - 25));
        let ab = overlap(&a, &b);
        let ba = overlap(&b, &a);
        assert_eq!(ab.days, 6);
        assert_eq!(ba.days, 6);
        // 6 / 11 = 54.5% → 55
        assert_eq!(ab.percentage, 55);
        assert_eq!(ba.percentage, 55);
    }

    #[test]
    fn percentage_depends_on_reference() {
        let a = range(date!(2024 - 01 - 01), date!(2024 - 01 - 10)); // 10 days
        let b = range(date!(2024 - 01 - 05), date!(2024 - 01 - 30)); // 26 days
        let from_a = overlap(&a, &b);
        let from_b = overlap(&b, &a);
        assert_eq!(from_a.days, 6);
        assert_eq!(from_b.days, 6);
        assert_eq!(from_a.percentage, 60);
        assert_eq!(from_b.percentage, 23);
    }

    #[test]
    fn disjoint_ranges_have_no_overlap() {
        let a = range(date!(2024 - 01 - 01), date!(2024 - 01 - 05));
        let b = range(date!(2024 - 01 - 10), date!(2024 - 01 - 15));
        assert_eq!(overlap(&a, &b), Overlap::NONE);
        assert_eq!(overlap(&b, &a).days, 0);
    }

    #[test]
    fn shared_boundary_day_counts_once() {
        let a = range(date!(2024 - 01 - 01), date!(2024 - 01 - 05));
        let b = range(date!(2024 - 01 - 05), date!(2024 - 01 - 09));
        let o = overlap(&a, &b);
        assert_eq!(o.days, 1);
        assert_eq!(o.percentage, 20);
    }

    #[test]
    fn reference_inside_other_is_full() {
        let a = range(date!(2024 - 03 - 02), date!(2024 - 03 - 04));
        let b = range(date!(2024 - 03 - 01), date!(2024 - 03 - 31));
        let o = overlap(&a, &b);
        assert_eq!(o.days, 3);
        assert_eq!(o.percentage, 100);
        // and the wide side sees only a sliver: 3 / 31 = 9.7% → 10
        assert_eq!(overlap(&b, &a).percentage, 10);
    }

    #[test]
    fn half_overlap_is_exactly_fifty() {
        let candidate = range(date!(2024 - 06 - 10), date!(2024 - 06 - 15));
        let other = range(date!(2024 - 06 - 13), date!(2024 - 06 - 20));
        let o = overlap(&candidate, &other);
        assert_eq!(o.days, 3);
        assert_eq!(o.percentage, 50);
    }

    #[test]
    fn overlap_across_month_and_leap_day() {
        let a = range(date!(2024 - 02 - 27), date!(2024 - 03 - 02)); // 5 days incl. Feb 29
        let b = range(date!(2024 - 02 - 29), date!(2024 - 03 - 10));
        let o = overlap(&a, &b);
        assert_eq!(o.days, 3);
        assert_eq!(o.percentage, 60);
    }

    #[test]
    fn rounded_percent_edges() {
        assert_eq!(rounded_percent(0, 10), 0);
        assert_eq!(rounded_percent(1, 0), 0);
        assert_eq!(rounded_percent(1, 200), 1); // 0.5 rounds up
        assert_eq!(rounded_percent(1, 201), 0);
        assert_eq!(rounded_percent(10, 10), 100);
    }
}
