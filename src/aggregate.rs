//! Summary statistics, groupings and rankings over a slice of records.
//!
//! Every function here is total: an empty slice yields zeros or empty
//! collections, never a panic. Groupings iterate in first-occurrence order
//! so repeated runs over the same data produce identical output.

use crate::types::{GroupAverage, PollutantCount, Record, TrendPoint};
use crate::util::{average, percent, round_half_up};
use chrono::Datelike;
use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;

/// Statuses counted as "Poor or worse" in the headline KPI.
pub const POOR_SEVERE: [&str; 2] = ["Poor", "Severe"];
pub const GOOD: [&str; 1] = ["Good"];

/// Mean AQI over all records, rounded. `0` for no records.
pub fn average_aqi(data: &[Record]) -> i64 {
    let values: Vec<f64> = data.iter().map(|r| r.aqi_value).collect();
    round_half_up(average(&values))
}

/// Highest AQI reading, or `0` when there are no records.
pub fn max_aqi(data: &[Record]) -> f64 {
    data.iter().map(|r| r.aqi_value).fold(0.0, f64::max)
}

/// Rounded share of records whose status is one of `statuses`.
pub fn percent_in_statuses(data: &[Record], statuses: &[&str]) -> i64 {
    let hits = data
        .iter()
        .filter(|r| statuses.contains(&r.air_quality_status.as_str()))
        .count();
    percent(hits, data.len())
}

/// Mean AQI per distinct key, in order of first appearance.
pub fn group_average_by<F>(data: &[Record], key_fn: F) -> Vec<GroupAverage>
where
    F: Fn(&Record) -> &str,
{
    let mut acc: IndexMap<&str, (f64, usize)> = IndexMap::new();
    for r in data {
        let e = acc.entry(key_fn(r)).or_insert((0.0, 0));
        e.0 += r.aqi_value;
        e.1 += 1;
    }
    acc.into_iter()
        .map(|(key, (sum, count))| GroupAverage {
            key: key.to_string(),
            avg: round_half_up(sum / count as f64),
        })
        .collect()
}

/// The `k` groups with the highest average, descending. Equal averages keep
/// their original group order.
pub fn top_k_by_average(groups: &[GroupAverage], k: usize) -> Vec<GroupAverage> {
    ranked(groups, k, |a, b| b.avg.cmp(&a.avg))
}

/// The `k` groups with the lowest average, ascending. Equal averages keep
/// their original group order.
pub fn bottom_k_by_average(groups: &[GroupAverage], k: usize) -> Vec<GroupAverage> {
    ranked(groups, k, |a, b| a.avg.cmp(&b.avg))
}

fn ranked<F>(groups: &[GroupAverage], k: usize, cmp: F) -> Vec<GroupAverage>
where
    F: FnMut(&GroupAverage, &GroupAverage) -> Ordering,
{
    let mut sorted = groups.to_vec();
    // `sort_by` is stable, which gives the first-encountered tie-break.
    sorted.sort_by(cmp);
    sorted.truncate(k);
    sorted
}

/// Number of records mentioning each pollutant. A record counts at most once
/// per pollutant even if its cell repeats the token.
pub fn pollutant_frequency<'a>(
    data: impl IntoIterator<Item = &'a Record>,
) -> IndexMap<String, usize> {
    let mut freq: IndexMap<String, usize> = IndexMap::new();
    for r in data {
        let unique: IndexSet<&str> = r.prominent_pollutants.iter().map(String::as_str).collect();
        for token in unique {
            *freq.entry(token.to_string()).or_insert(0) += 1;
        }
    }
    freq
}

/// `pollutant_frequency` computed separately within each state.
pub fn pollutant_frequency_by_state(data: &[Record]) -> IndexMap<String, IndexMap<String, usize>> {
    let mut by_state: IndexMap<&str, Vec<&Record>> = IndexMap::new();
    for r in data {
        by_state.entry(r.state.as_str()).or_default().push(r);
    }
    by_state
        .into_iter()
        .map(|(state, rows)| (state.to_string(), pollutant_frequency(rows)))
        .collect()
}

/// Most frequent pollutants, descending by count, ties in table order.
pub fn top_pollutants(freq: &IndexMap<String, usize>, k: usize) -> Vec<PollutantCount> {
    let mut rows: Vec<PollutantCount> = freq
        .iter()
        .map(|(pollutant, count)| PollutantCount {
            pollutant: pollutant.clone(),
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(k);
    rows
}

/// The mode of a frequency table; the earliest entry wins a tie.
pub fn top_pollutant(freq: &IndexMap<String, usize>) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for (token, count) in freq {
        if *count == 0 {
            continue;
        }
        let better = best.map_or(true, |(_, c)| *count > c);
        if better {
            best = Some((token.as_str(), *count));
        }
    }
    best.map(|(token, _)| token)
}

/// Mean AQI for each calendar month of `year`. Index 0 is January; months
/// without readings report `0`. Undated records are ignored.
pub fn monthly_average<'a>(
    data: impl IntoIterator<Item = &'a Record>,
    year: i32,
) -> [i64; 12] {
    let mut sums = [(0.0_f64, 0_usize); 12];
    for r in data {
        let Some(date) = r.date else { continue };
        if date.year() != year {
            continue;
        }
        let slot = &mut sums[date.month0() as usize];
        slot.0 += r.aqi_value;
        slot.1 += 1;
    }
    sums.map(|(sum, count)| {
        if count == 0 {
            0
        } else {
            round_half_up(sum / count as f64)
        }
    })
}

/// Record count per status label, in order of first appearance.
pub fn status_counts(data: &[Record]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for r in data {
        *counts.entry(r.air_quality_status.clone()).or_insert(0) += 1;
    }
    counts
}

/// Dated records sorted by date. Same-day readings keep their file order.
pub fn trend(data: &[Record]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = data
        .iter()
        .filter_map(|r| {
            r.date.map(|date| TrendPoint {
                date,
                aqi: r.aqi_value,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

pub fn latest_year(data: &[Record]) -> Option<i32> {
    data.iter().filter_map(|r| r.date).map(|d| d.year()).max()
}

/// Narrow a dataset to one state and/or one calendar month (1-12).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub state: Option<String>,
    pub month: Option<u32>,
}

impl RecordFilter {
    pub fn matches(&self, r: &Record) -> bool {
        if let Some(state) = &self.state {
            if &r.state != state {
                return false;
            }
        }
        if let Some(month) = self.month {
            if r.date.map(|d| d.month()) != Some(month) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, data: &[Record]) -> Vec<Record> {
        data.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(date: &str, state: &str, area: &str, aqi: f64, status: &str, pollutants: &[&str]) -> Record {
        Record {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            state: state.to_string(),
            area: area.to_string(),
            aqi_value: aqi,
            air_quality_status: status.to_string(),
            prominent_pollutants: pollutants.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("2025-01-03", "Delhi", "Rohini", 320.0, "Severe", &["PM2.5", "PM10"]),
            rec("2025-01-10", "Delhi", "Dwarka", 210.0, "Poor", &["PM2.5"]),
            rec("2025-02-01", "Kerala", "Kochi", 45.0, "Good", &["O3"]),
            rec("2025-02-14", "Kerala", "Kochi", 55.0, "Satisfactory", &["O3", "PM10"]),
            rec("2024-02-14", "Bihar", "Patna", 150.0, "Moderate", &["NO2"]),
        ]
    }

    #[test]
    fn empty_input_is_zero_safe() {
        assert_eq!(average_aqi(&[]), 0);
        assert_eq!(max_aqi(&[]), 0.0);
        assert_eq!(percent_in_statuses(&[], &POOR_SEVERE), 0);
        assert!(group_average_by(&[], |r| r.state.as_str()).is_empty());
        assert!(pollutant_frequency(&Vec::<Record>::new()).is_empty());
        assert_eq!(monthly_average(&Vec::<Record>::new(), 2025), [0; 12]);
        assert!(status_counts(&[]).is_empty());
        assert_eq!(latest_year(&[]), None);
    }

    #[test]
    fn headline_numbers() {
        let data = sample();
        // (320 + 210 + 45 + 55 + 150) / 5 = 156
        assert_eq!(average_aqi(&data), 156);
        assert_eq!(max_aqi(&data), 320.0);
        assert_eq!(percent_in_statuses(&data, &POOR_SEVERE), 40);
        assert_eq!(percent_in_statuses(&data, &GOOD), 20);
        assert_eq!(percent_in_statuses(&data, &["Unheard"]), 0);
    }

    #[test]
    fn two_record_scenario() {
        let data = vec![
            rec("2025-01-01", "A", "a1", 200.0, "Severe", &["PM2.5"]),
            rec("2025-01-01", "B", "b1", 50.0, "Good", &["O3"]),
        ];
        assert_eq!(average_aqi(&data), 125);
        assert_eq!(percent_in_statuses(&data, &POOR_SEVERE), 50);
        let top = top_k_by_average(&group_average_by(&data, |r| r.state.as_str()), 5);
        let pairs: Vec<(&str, i64)> = top.iter().map(|g| (g.key.as_str(), g.avg)).collect();
        assert_eq!(pairs, vec![("A", 200), ("B", 50)]);
    }

    #[test]
    fn grouping_keeps_first_occurrence_order() {
        let groups = group_average_by(&sample(), |r| r.state.as_str());
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Delhi", "Kerala", "Bihar"]);
        assert_eq!(groups[0].avg, 265);
        assert_eq!(groups[1].avg, 50);
    }

    #[test]
    fn grouping_is_case_and_whitespace_sensitive() {
        let data = vec![
            rec("2025-01-01", "Delhi", "x", 10.0, "Good", &[]),
            rec("2025-01-01", "delhi", "x", 20.0, "Good", &[]),
            rec("2025-01-01", "Delhi ", " x", 30.0, "Good", &[]),
        ];
        assert_eq!(group_average_by(&data, |r| r.state.as_str()).len(), 3);
        assert_eq!(group_average_by(&data, |r| r.area.as_str()).len(), 2);
    }

    #[test]
    fn rankings_are_ordered_and_stable() {
        let groups = vec![
            GroupAverage { key: "a".into(), avg: 100 },
            GroupAverage { key: "b".into(), avg: 300 },
            GroupAverage { key: "c".into(), avg: 100 },
            GroupAverage { key: "d".into(), avg: 50 },
            GroupAverage { key: "e".into(), avg: 300 },
        ];
        let top3 = top_k_by_average(&groups, 3);
        let top: Vec<&str> = top3.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(top, vec!["b", "e", "a"]);
        let bottom3 = bottom_k_by_average(&groups, 3);
        let bottom: Vec<&str> = bottom3.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(bottom, vec!["d", "a", "c"]);

        let top = top_k_by_average(&groups, 5);
        assert!(top.windows(2).all(|w| w[0].avg >= w[1].avg));
        let bottom = bottom_k_by_average(&groups, 5);
        assert!(bottom.windows(2).all(|w| w[0].avg <= w[1].avg));
        assert!(top.iter().all(|g| groups.contains(g)));
        assert!(bottom.iter().all(|g| groups.contains(g)));

        assert_eq!(top_k_by_average(&groups, 10).len(), 5);
        assert!(top_k_by_average(&[], 5).is_empty());
    }

    #[test]
    fn pollutants_count_once_per_record() {
        let data = vec![
            rec("2025-01-01", "A", "x", 10.0, "Good", &["PM10", "PM10", "NO2"]),
            rec("2025-01-02", "A", "x", 10.0, "Good", &["NO2"]),
        ];
        let freq = pollutant_frequency(&data);
        assert_eq!(freq.get("PM10"), Some(&1));
        assert_eq!(freq.get("NO2"), Some(&2));
        assert_eq!(top_pollutant(&freq), Some("NO2"));
    }

    #[test]
    fn per_state_frequency_and_top_list() {
        let by_state = pollutant_frequency_by_state(&sample());
        let states: Vec<&str> = by_state.keys().map(String::as_str).collect();
        assert_eq!(states, vec!["Delhi", "Kerala", "Bihar"]);

        let delhi = &by_state["Delhi"];
        assert_eq!(delhi.get("PM2.5"), Some(&2));
        assert_eq!(delhi.get("PM10"), Some(&1));
        let top = top_pollutants(delhi, 5);
        assert_eq!(top[0], PollutantCount { pollutant: "PM2.5".into(), count: 2 });
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn frequency_accepts_borrowed_subsets() {
        let data = sample();
        let kerala: Vec<&Record> = data.iter().filter(|r| r.state == "Kerala").collect();
        let freq = pollutant_frequency(kerala);
        assert_eq!(freq.get("O3"), Some(&2));
        assert_eq!(freq.get("PM10"), Some(&1));
        assert_eq!(freq, pollutant_frequency_by_state(&data)["Kerala"]);
    }

    #[test]
    fn top_pollutant_tie_goes_to_first_seen() {
        let mut freq = IndexMap::new();
        freq.insert("SO2".to_string(), 3);
        freq.insert("CO".to_string(), 3);
        freq.insert("O3".to_string(), 1);
        assert_eq!(top_pollutant(&freq), Some("SO2"));
        assert_eq!(top_pollutant(&IndexMap::new()), None);
    }

    #[test]
    fn monthly_average_has_twelve_slots() {
        let data = sample();
        let y2025 = monthly_average(&data, 2025);
        assert_eq!(y2025[0], 265);
        assert_eq!(y2025[1], 50);
        assert!(y2025[2..].iter().all(|v| *v == 0));

        let y2024 = monthly_average(&data, 2024);
        assert_eq!(y2024[1], 150);
        assert_eq!(y2024[0], 0);
    }

    #[test]
    fn undated_records_skip_monthly_but_count_elsewhere() {
        let mut data = sample();
        data.push(rec("not a date", "Goa", "Panaji", 500.0, "Severe", &[]));
        assert_eq!(monthly_average(&data, 2025)[0], 265);
        assert_eq!(max_aqi(&data), 500.0);
        assert_eq!(trend(&data).len(), 5);
    }

    #[test]
    fn status_counts_follow_first_appearance() {
        let counts = status_counts(&sample());
        let keys: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Severe", "Poor", "Good", "Satisfactory", "Moderate"]);
        assert!(counts.values().all(|c| *c == 1));
    }

    #[test]
    fn trend_is_sorted_by_date() {
        let points = trend(&sample());
        assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(points[0].aqi, 150.0);
        assert_eq!(latest_year(&sample()), Some(2025));
    }

    #[test]
    fn filter_by_state_and_month() {
        let data = sample();
        let only_kerala = RecordFilter { state: Some("Kerala".into()), month: None };
        assert_eq!(only_kerala.apply(&data).len(), 2);

        let february = RecordFilter { state: None, month: Some(2) };
        assert_eq!(february.apply(&data).len(), 3);

        let both = RecordFilter { state: Some("Kerala".into()), month: Some(1) };
        assert!(both.apply(&data).is_empty());

        assert_eq!(RecordFilter::default().apply(&data).len(), data.len());
    }
}
