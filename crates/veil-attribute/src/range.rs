//! Shared machinery for range-shaped lattices (integers, dates).
//!
//! Both range types reduce their values to inclusive `(lo, hi)` ordinal
//! intervals; the cost metric and the greedy overlap-absorbing split work
//! on those ordinals alone.

/// Mean span-ratio cost of generalizing `spans` to an aggregate covering
/// `agg` units, shifted so a singleton partition costs exactly 0.
///
/// Each member contributes `agg_units / member_units`; the mean minus one
/// is returned. The shift cancels out of the information-gain formula
/// (`2e - e_left - e_right`) and keeps the singleton invariant.
pub(crate) fn mean_span_cost(agg_units: i64, spans: &[(i64, i64)]) -> f64 {
    if spans.is_empty() {
        return 0.0;
    }
    let total: f64 = spans
        .iter()
        .map(|&(lo, hi)| agg_units as f64 / (hi - lo + 1) as f64)
        .sum();
    total / spans.len() as f64 - 1.0
}

/// Splits interval-valued members into two groups of at least `k`,
/// keeping overlapping intervals on the same side.
///
/// Members are sorted by `(lo, hi)`; the smaller side greedily accumulates
/// a sorted prefix, extending past `k` while any subsequent interval
/// starts inside the span already taken. Returns index groups into the
/// input slice, or `None` when either side would fall below `k`.
pub(crate) fn greedy_interval_split(
    spans: &[(i64, i64)],
    k: usize,
) -> Option<(Vec<usize>, Vec<usize>)> {
    if spans.len() < 2 * k {
        return None;
    }

    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&i| spans[i]);

    let mut taken = Vec::with_capacity(k);
    let mut rest: std::collections::VecDeque<usize> = order.into();

    while taken.len() < k && rest.len() >= k {
        let lead = rest[0];
        let mut current_max = spans[lead].1;
        while let Some(&next) = rest.front() {
            if spans[next].0 > current_max {
                break;
            }
            rest.pop_front();
            taken.push(next);
            current_max = current_max.max(spans[next].1);
        }
    }

    if taken.len() >= k && rest.len() >= k {
        Some((taken, rest.into()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_cost_is_zero() {
        assert_eq!(mean_span_cost(1, &[(5, 5)]), 0.0);
    }

    #[test]
    fn cost_grows_with_aggregate_span() {
        let spans = [(5, 5), (7, 7)];
        let narrow = mean_span_cost(3, &spans);
        let wide = mean_span_cost(100, &spans);
        assert!(narrow > 0.0);
        assert!(wide > narrow);
    }

    #[test]
    fn split_refuses_below_two_k() {
        assert!(greedy_interval_split(&[(1, 1), (2, 2), (3, 3)], 2).is_none());
    }

    #[test]
    fn split_keeps_overlaps_together() {
        // (1,10) overlaps (2,3) and (9,12); all three must land on one side.
        let spans = [(1, 10), (2, 3), (9, 12), (50, 50), (60, 60), (70, 70)];
        let (left, right) = greedy_interval_split(&spans, 3).unwrap();
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
        for i in [0, 1, 2] {
            assert!(left.contains(&i));
        }
    }

    #[test]
    fn split_fails_when_everything_overlaps() {
        let spans = [(1, 100); 6];
        assert!(greedy_interval_split(&spans, 3).is_none());
    }
}
