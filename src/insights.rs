//! Builds the insights and dashboard reports from a loaded dataset.
//!
//! Both entry points are pure: the caller hands over the dataset it just
//! loaded and gets a fresh report back. Nothing is cached between calls.

use crate::aggregate::{
    average_aqi, bottom_k_by_average, group_average_by, latest_year, max_aqi, monthly_average,
    percent_in_statuses, pollutant_frequency, pollutant_frequency_by_state, status_counts,
    top_k_by_average, top_pollutant, top_pollutants, trend, RecordFilter, GOOD, POOR_SEVERE,
};
use crate::policy::{enriched_suggestion, purifier_for, severity_suggestion, severity_tier};
use crate::types::{
    AreaAverageRow, DashboardReport, Dataset, GroupAverage, InsightsReport, MonthlyComparisonRow,
    Record, StateAverageRow, StateSummary,
};
use chrono::{Datelike, Local};
use tracing::debug;

pub const TOP_STATES: usize = 5;
pub const TOP_POLLUTANTS: usize = 5;
pub const TOP_AREAS: usize = 5;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsightsOptions {
    /// Include the detailed action list alongside the tier message.
    pub enrich: bool,
}

pub fn compute_insights(dataset: &Dataset, options: InsightsOptions) -> InsightsReport {
    let data = dataset.records.as_slice();
    let avg_aqi = average_aqi(data);

    let state_groups = group_average_by(data, |r| r.state.as_str());
    let top_states = top_k_by_average(&state_groups, TOP_STATES)
        .into_iter()
        .map(|g| StateAverageRow {
            state: g.key,
            avg: g.avg,
        })
        .collect();

    let state_summaries = pollutant_frequency_by_state(data)
        .into_iter()
        .map(|(state, freq)| StateSummary {
            top_pollutants: top_pollutants(&freq, TOP_POLLUTANTS),
            purifier_suggestion: purifier_for(&freq).to_string(),
            state,
        })
        .collect::<Vec<_>>();

    debug!(
        records = data.len(),
        states = state_summaries.len(),
        avg_aqi,
        "insights computed"
    );

    InsightsReport {
        avg_aqi,
        max_aqi: max_aqi(data),
        total_days: data.len(),
        percent_poor_severe: percent_in_statuses(data, &POOR_SEVERE),
        top_states,
        severity_tier: severity_tier(avg_aqi),
        suggestion: severity_suggestion(avg_aqi).to_string(),
        enriched_suggestion: options.enrich.then(|| enriched_suggestion(avg_aqi)),
        state_summaries,
        coerced_rows: dataset.coerced_rows,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pub filter: RecordFilter,
    /// Year for the monthly comparison; defaults to the latest year in the
    /// data, or the current year when nothing is dated.
    pub year: Option<i32>,
}

/// Dashboard figures for the rows selected by `query.filter`.
///
/// `baseline` is an optional historical dataset whose overall average is
/// reported next to the filtered average for a past-vs-future comparison.
pub fn compute_dashboard(
    dataset: &Dataset,
    query: &DashboardQuery,
    baseline: Option<&Dataset>,
) -> DashboardReport {
    let year = query
        .year
        .or_else(|| latest_year(&dataset.records))
        .unwrap_or_else(|| Local::now().year());

    let rows = query.filter.apply(&dataset.records);

    let area_groups = group_average_by(&rows, |r| r.area.as_str());
    let top_areas = to_area_rows(top_k_by_average(&area_groups, TOP_AREAS));
    let bottom_areas = to_area_rows(bottom_k_by_average(&area_groups, TOP_AREAS));

    // The comparison spans the whole year, so only the state filter applies.
    let by_state = RecordFilter {
        state: query.filter.state.clone(),
        month: None,
    };
    let season: Vec<&Record> = dataset.records.iter().filter(|r| by_state.matches(r)).collect();
    let this_year = monthly_average(season.iter().copied(), year);
    let last_year = monthly_average(season.iter().copied(), year - 1);
    let monthly_comparison = MONTH_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| MonthlyComparisonRow {
            month: label.to_string(),
            this_year_avg: this_year[i],
            last_year_avg: last_year[i],
        })
        .collect();

    let freq = pollutant_frequency(&rows);

    debug!(rows = rows.len(), year, "dashboard computed");

    DashboardReport {
        state: query.filter.state.clone(),
        month: query.filter.month,
        year,
        total_days: rows.len(),
        avg_aqi: average_aqi(&rows),
        max_aqi: max_aqi(&rows),
        percent_poor_severe: percent_in_statuses(&rows, &POOR_SEVERE),
        percent_good: percent_in_statuses(&rows, &GOOD),
        category_counts: status_counts(&rows),
        area_averages: to_area_rows(area_groups),
        top_areas,
        bottom_areas,
        monthly_comparison,
        trend: trend(&rows),
        past_avg_aqi: baseline.map(|b| average_aqi(&b.records)),
        top_pollutant: top_pollutant(&freq).map(str::to_string),
        purifier_suggestion: purifier_for(&freq).to_string(),
    }
}

fn to_area_rows(groups: Vec<GroupAverage>) -> Vec<AreaAverageRow> {
    groups
        .into_iter()
        .map(|g| AreaAverageRow {
            area: g.key,
            avg_aqi: g.avg,
        })
        .collect()
}
