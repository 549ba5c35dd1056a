//! Rule tables that turn aggregate numbers into advice.
//!
//! Both tables are plain lookups; new status labels or pollutant names fall
//! through to defined fallbacks instead of failing.

use crate::aggregate::top_pollutant;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Good,
    Moderate,
    High,
}

/// Checked top to bottom; the first threshold the average exceeds wins.
const SEVERITY_LADDER: [(i64, SeverityTier); 2] =
    [(150, SeverityTier::High), (100, SeverityTier::Moderate)];

const HIGH_MESSAGE: &str = "High pollution levels detected. Restrict heavy vehicle traffic in \
     the worst affected areas, promote public transport and car-pooling, and issue health \
     advisories for children, the elderly and people with respiratory conditions.";
const MODERATE_MESSAGE: &str = "Moderate pollution levels. Limit industrial emissions during \
     peak hours and encourage remote work to reduce commuter traffic.";
const GOOD_MESSAGE: &str =
    "Air quality is within acceptable limits. Maintain regular monitoring.";

/// Appended to the tier message when a detailed suggestion is requested.
pub const ENRICHED_ACTIONS: &str = " Detailed actions: 1) Schedule road dust suppression and \
     water sprinkling on arterial roads. 2) Enforce construction site covering and debris \
     management. 3) Audit industrial stacks and brick kilns for emission compliance. \
     4) Ban open burning of waste and crop residue. 5) Expand green buffers along high \
     traffic corridors. 6) Publish daily AQI alerts through local media and schools.";

pub const GENERIC_ADVISORY: &str = "Maintain ventilation and use appropriate filters.";
pub const NO_DATA: &str = "No data";

static PURIFIER_ADVICE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "PM2.5",
            "Use a purifier with a True HEPA (H13 or better) filter sized for the room.",
        ),
        (
            "PM10",
            "Use a HEPA purifier with a washable pre-filter to capture coarse dust.",
        ),
        (
            "NO2",
            "Use a purifier with an activated carbon filter and ventilate away from traffic.",
        ),
        (
            "SO2",
            "Use an activated carbon purifier with impregnated media for acidic gases.",
        ),
        (
            "O3",
            "Use an activated carbon purifier and avoid ionizer or ozone-generating units.",
        ),
        (
            "CO",
            "Purifiers do not remove CO; improve ventilation and install a CO detector.",
        ),
    ])
});

pub fn severity_tier(avg_aqi: i64) -> SeverityTier {
    SEVERITY_LADDER
        .iter()
        .find(|(threshold, _)| avg_aqi > *threshold)
        .map(|(_, tier)| *tier)
        .unwrap_or(SeverityTier::Good)
}

impl SeverityTier {
    pub fn message(self) -> &'static str {
        match self {
            SeverityTier::High => HIGH_MESSAGE,
            SeverityTier::Moderate => MODERATE_MESSAGE,
            SeverityTier::Good => GOOD_MESSAGE,
        }
    }
}

pub fn severity_suggestion(avg_aqi: i64) -> &'static str {
    severity_tier(avg_aqi).message()
}

/// The tier message followed by the fixed detailed action list.
pub fn enriched_suggestion(avg_aqi: i64) -> String {
    format!("{}{}", severity_suggestion(avg_aqi), ENRICHED_ACTIONS)
}

/// Advice for a single pollutant token; unknown tokens get the generic advice.
pub fn purifier_suggestion(token: &str) -> &'static str {
    PURIFIER_ADVICE.get(token).copied().unwrap_or(GENERIC_ADVISORY)
}

/// Advice for a group based on its most frequent pollutant, or `NO_DATA`
/// when the group never mentions one.
pub fn purifier_for(freq: &IndexMap<String, usize>) -> &'static str {
    match top_pollutant(freq) {
        Some(token) => purifier_suggestion(token),
        None => NO_DATA,
    }
}
