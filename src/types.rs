use crate::policy::SeverityTier;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Columns every dataset header must carry. `prominent_pollutants` is optional.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "date",
    "state",
    "area",
    "aqi_value",
    "air_quality_status",
];

/// One CSV row exactly as it comes off the reader. Everything is optional so
/// a single bad cell never fails the whole row decode; cleaning happens in
/// `loader::parse_record`. Unknown columns are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    pub date: Option<String>,
    pub state: Option<String>,
    pub area: Option<String>,
    pub aqi_value: Option<String>,
    pub air_quality_status: Option<String>,
    pub prominent_pollutants: Option<String>,
}

/// A single cleaned AQI observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// `None` when the source date could not be parsed.
    pub date: Option<NaiveDate>,
    pub state: String,
    pub area: String,
    pub aqi_value: f64,
    pub air_quality_status: String,
    /// Tokens in source order; within-row duplicates are kept.
    pub prominent_pollutants: Vec<String>,
}

/// Records in file row order plus the number of rows whose AQI had to be
/// coerced to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub coerced_rows: usize,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            coerced_rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Mean AQI of one group (state, area, ...), rounded to an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAverage {
    pub key: String,
    pub avg: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StateAverageRow {
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "AvgAQI")]
    pub avg: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct AreaAverageRow {
    #[serde(rename = "area")]
    #[tabled(rename = "Area")]
    pub area: String,
    #[serde(rename = "avgAQI")]
    #[tabled(rename = "AvgAQI")]
    pub avg_aqi: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct PollutantCount {
    #[tabled(rename = "Pollutant")]
    pub pollutant: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub state: String,
    pub top_pollutants: Vec<PollutantCount>,
    pub purifier_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    #[serde(rename = "avgAQI")]
    pub avg_aqi: i64,
    #[serde(rename = "maxAQI")]
    pub max_aqi: f64,
    #[serde(rename = "totalDays")]
    pub total_days: usize,
    #[serde(rename = "percentPoorSevere")]
    pub percent_poor_severe: i64,
    #[serde(rename = "topStates")]
    pub top_states: Vec<StateAverageRow>,
    #[serde(rename = "severityTier")]
    pub severity_tier: SeverityTier,
    pub suggestion: String,
    #[serde(rename = "enrichedSuggestion", skip_serializing_if = "Option::is_none")]
    pub enriched_suggestion: Option<String>,
    #[serde(rename = "stateSummaries")]
    pub state_summaries: Vec<StateSummary>,
    #[serde(rename = "coercedRows")]
    pub coerced_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparisonRow {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "ThisYearAvg")]
    pub this_year_avg: i64,
    #[tabled(rename = "LastYearAvg")]
    pub last_year_avg: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub aqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub state: Option<String>,
    pub month: Option<u32>,
    pub year: i32,
    pub total_days: usize,
    #[serde(rename = "avgAQI")]
    pub avg_aqi: i64,
    #[serde(rename = "maxAQI")]
    pub max_aqi: f64,
    pub percent_poor_severe: i64,
    pub percent_good: i64,
    pub category_counts: IndexMap<String, usize>,
    pub area_averages: Vec<AreaAverageRow>,
    pub top_areas: Vec<AreaAverageRow>,
    pub bottom_areas: Vec<AreaAverageRow>,
    pub monthly_comparison: Vec<MonthlyComparisonRow>,
    pub trend: Vec<TrendPoint>,
    #[serde(rename = "pastAvgAQI", skip_serializing_if = "Option::is_none")]
    pub past_avg_aqi: Option<i64>,
    pub top_pollutant: Option<String>,
    pub purifier_suggestion: String,
}
