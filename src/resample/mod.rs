//! Per-series normalization to a monthly cadence.
//!
//! Every source series is reduced to one value per calendar month, keyed by the
//! first day of the month so the assembler can join on identical keys. The
//! reduction depends on the native frequency:
//!
//! - quarterly: forward-fill each observation across the months it covers
//! - daily: mean of the month's numeric observations
//! - weekly: sum of the month's numeric observations
//! - monthly: as reported (last observation in a month wins)
//!
//! Normalization never fails. Missing markers are already `None` on the
//! `Observation`, and an empty input yields an empty series.

use chrono::NaiveDate;

use crate::domain::{
    Frequency, MonthRange, MonthlySeries, Observation, month_start, months_between, quarter_last_month,
};

/// Normalize raw observations of the given frequency to a monthly series.
pub fn normalize(observations: &[Observation], frequency: Frequency) -> MonthlySeries {
    if observations.is_empty() {
        return MonthlySeries::empty();
    }

    // Sources are expected to report ascending dates, but we don't rely on it.
    // The sort is stable so same-date duplicates keep their reported order.
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.date);

    match frequency {
        Frequency::Quarterly => forward_fill(&sorted),
        Frequency::Daily => reduce_by_month(&sorted, mean),
        Frequency::Weekly => reduce_by_month(&sorted, sum),
        Frequency::Monthly => last_by_month(&sorted),
    }
}

/// Normalize, then fit the result to `range`.
///
/// Months outside the range are dropped (a trailing quarterly fill would
/// otherwise run past the requested end) and missing months inside it are
/// padded as absent. An empty input still yields an empty series: "no data"
/// must stay distinguishable from "data that happens to be absent".
pub fn normalize_within(
    observations: &[Observation],
    frequency: Frequency,
    range: &MonthRange,
) -> MonthlySeries {
    let mut series = normalize(observations, frequency);
    if series.is_empty() {
        return series;
    }
    series.clip_to(range);
    if series.is_empty() {
        return MonthlySeries::from_values(range.start, range.months().into_iter().map(|_| None));
    }
    series.pad_to(range);
    series
}

/// Forward-fill quarterly observations to months.
///
/// Each observation covers its own month up to the month before the next
/// observation. The final observation covers through the end of its quarter.
/// Absent observations cover their months with absent values.
fn forward_fill(sorted: &[Observation]) -> MonthlySeries {
    let mut pairs: Vec<(NaiveDate, Option<f64>)> = Vec::new();

    for (idx, obs) in sorted.iter().enumerate() {
        let month = month_start(obs.date);
        let covered: Vec<NaiveDate> = match sorted.get(idx + 1) {
            Some(next) => {
                let until = month_start(next.date);
                months_between(month, until)
                    .into_iter()
                    .take_while(|m| *m < until)
                    .collect()
            }
            None => months_between(month, quarter_last_month(month)),
        };
        pairs.extend(covered.into_iter().map(|m| (m, obs.value)));
    }

    MonthlySeries::from_pairs(pairs)
}

fn reduce_by_month(sorted: &[Observation], reduce: fn(&[f64]) -> f64) -> MonthlySeries {
    let mut pairs: Vec<(NaiveDate, Option<f64>)> = Vec::new();
    let mut current: Option<NaiveDate> = None;
    let mut bucket: Vec<f64> = Vec::new();

    for obs in sorted {
        let month = month_start(obs.date);
        if let Some(open) = current {
            if open != month {
                pairs.push((open, reduce_bucket(&bucket, reduce)));
                bucket.clear();
            }
        }
        current = Some(month);
        if let Some(v) = obs.value {
            bucket.push(v);
        }
    }
    if let Some(open) = current {
        pairs.push((open, reduce_bucket(&bucket, reduce)));
    }

    MonthlySeries::from_pairs(pairs)
}

fn reduce_bucket(bucket: &[f64], reduce: fn(&[f64]) -> f64) -> Option<f64> {
    if bucket.is_empty() {
        None
    } else {
        Some(reduce(bucket))
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn last_by_month(sorted: &[Observation]) -> MonthlySeries {
    MonthlySeries::from_pairs(sorted.iter().map(|o| (o.date, o.value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(date: NaiveDate, v: f64) -> Observation {
        Observation::new(date, Some(v))
    }

    #[test]
    fn quarterly_forward_fills_until_next_observation() {
        let raw = vec![obs(d(2024, 1, 1), 10.0), obs(d(2024, 4, 1), 20.0)];
        let s = normalize(&raw, Frequency::Quarterly);
        assert_eq!(
            s.values(),
            vec![Some(10.0), Some(10.0), Some(10.0), Some(20.0), Some(20.0), Some(20.0)]
        );
        assert_eq!(s.first_month(), Some(d(2024, 1, 1)));
        assert_eq!(s.last_month(), Some(d(2024, 6, 1)));
    }

    #[test]
    fn quarterly_absent_marker_is_not_replaced() {
        let raw = vec![
            obs(d(2024, 1, 1), 10.0),
            Observation::from_raw(d(2024, 4, 1), "."),
            obs(d(2024, 7, 1), 30.0),
        ];
        let s = normalize(&raw, Frequency::Quarterly);
        assert_eq!(s.value_at(d(2024, 3, 1)), Some(10.0));
        assert_eq!(s.value_at(d(2024, 5, 1)), None);
        assert_eq!(s.value_at(d(2024, 9, 1)), Some(30.0));
        assert_eq!(s.len(), 9);
    }

    #[test]
    fn quarterly_does_not_run_past_the_last_quarter() {
        let raw = vec![obs(d(2024, 7, 1), 5.0)];
        let range = MonthRange::new(d(2024, 1, 1), d(2024, 12, 1)).unwrap();
        let s = normalize_within(&raw, Frequency::Quarterly, &range);
        assert_eq!(s.len(), 12);
        assert_eq!(s.value_at(d(2024, 6, 1)), None);
        assert_eq!(s.value_at(d(2024, 9, 1)), Some(5.0));
        assert_eq!(s.value_at(d(2024, 10, 1)), None);
    }

    #[test]
    fn trailing_quarter_fill_stops_at_range_end() {
        let raw = vec![obs(d(2024, 1, 1), 100.0), obs(d(2024, 4, 1), 110.0)];
        let range = MonthRange::new(d(2024, 1, 1), d(2024, 4, 15)).unwrap();
        let s = normalize_within(&raw, Frequency::Quarterly, &range);
        assert_eq!(s.last_month(), Some(d(2024, 4, 1)));
        assert_eq!(s.values(), vec![Some(100.0), Some(100.0), Some(100.0), Some(110.0)]);
    }

    #[test]
    fn observations_entirely_outside_range_become_absent_months() {
        let raw = vec![obs(d(2023, 1, 1), 1.0)];
        let range = MonthRange::new(d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        let s = normalize_within(&raw, Frequency::Monthly, &range);
        assert_eq!(s.values(), vec![None, None, None]);
        assert_eq!(s.first_month(), Some(d(2024, 1, 1)));
    }

    #[test]
    fn daily_takes_the_monthly_mean() {
        let raw = vec![
            obs(d(2024, 1, 2), 1.0),
            obs(d(2024, 1, 3), 2.0),
            obs(d(2024, 1, 4), 3.0),
        ];
        let s = normalize(&raw, Frequency::Daily);
        assert_eq!(s.len(), 1);
        assert_eq!(s.value_at(d(2024, 1, 1)), Some(2.0));
    }

    #[test]
    fn daily_skips_missing_markers_and_leaves_empty_months_absent() {
        let raw = vec![
            obs(d(2024, 1, 2), 4.0),
            Observation::from_raw(d(2024, 1, 3), "."),
            Observation::from_raw(d(2024, 2, 1), "."),
            obs(d(2024, 4, 1), 8.0),
        ];
        let s = normalize(&raw, Frequency::Daily);
        assert_eq!(s.values(), vec![Some(4.0), None, None, Some(8.0)]);
    }

    #[test]
    fn weekly_sums_and_empty_month_is_absent_not_zero() {
        let raw = vec![
            obs(d(2024, 1, 6), 1.0),
            obs(d(2024, 1, 13), 2.0),
            obs(d(2024, 1, 20), 3.0),
            Observation::from_raw(d(2024, 2, 3), "."),
            obs(d(2024, 3, 2), 7.0),
        ];
        let s = normalize(&raw, Frequency::Weekly);
        assert_eq!(s.values(), vec![Some(6.0), None, Some(7.0)]);
    }

    #[test]
    fn monthly_passes_through_and_last_duplicate_wins() {
        let raw = vec![
            obs(d(2024, 1, 1), 1.0),
            obs(d(2024, 2, 1), 2.0),
            obs(d(2024, 2, 1), 2.5),
            obs(d(2024, 3, 1), 3.0),
        ];
        let s = normalize(&raw, Frequency::Monthly);
        assert_eq!(s.values(), vec![Some(1.0), Some(2.5), Some(3.0)]);
    }

    #[test]
    fn unordered_input_is_sorted_first() {
        let raw = vec![obs(d(2024, 3, 1), 3.0), obs(d(2024, 1, 1), 1.0)];
        let s = normalize(&raw, Frequency::Monthly);
        assert_eq!(s.values(), vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn empty_input_stays_empty_even_with_a_range() {
        let range = MonthRange::new(d(2024, 1, 1), d(2024, 6, 1)).unwrap();
        for f in Frequency::ALL {
            assert!(normalize(&[], f).is_empty());
            assert!(normalize_within(&[], f, &range).is_empty());
        }
    }
}
