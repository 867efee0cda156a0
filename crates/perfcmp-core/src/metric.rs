use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A metric key as it appears in a report's `stats` object.
///
/// The well-known Gatling keys get their own variants; anything else a
/// caller asks for is carried through verbatim as [`MetricKey::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKey {
    MinResponseTime,
    MaxResponseTime,
    MeanResponseTime,
    /// 50th percentile slot.
    Percentiles1,
    /// 75th percentile slot.
    Percentiles2,
    /// 95th percentile slot.
    Percentiles3,
    /// 99th percentile slot.
    Percentiles4,
    StandardDeviation,
    Other(String),
}

/// The metrics compared when the caller does not pick any, in sheet order.
pub const DEFAULT_METRICS: [MetricKey; 8] = [
    MetricKey::MinResponseTime,
    MetricKey::MaxResponseTime,
    MetricKey::MeanResponseTime,
    MetricKey::Percentiles1,
    MetricKey::Percentiles2,
    MetricKey::Percentiles3,
    MetricKey::Percentiles4,
    MetricKey::StandardDeviation,
];

impl MetricKey {
    /// The raw key used inside `stats`.
    pub fn as_str(&self) -> &str {
        match self {
            MetricKey::MinResponseTime => "minResponseTime",
            MetricKey::MaxResponseTime => "maxResponseTime",
            MetricKey::MeanResponseTime => "meanResponseTime",
            MetricKey::Percentiles1 => "percentiles1",
            MetricKey::Percentiles2 => "percentiles2",
            MetricKey::Percentiles3 => "percentiles3",
            MetricKey::Percentiles4 => "percentiles4",
            MetricKey::StandardDeviation => "standardDeviation",
            MetricKey::Other(key) => key,
        }
    }

    /// Worksheet title for this metric.
    ///
    /// Only the four percentile slots are renamed; every other key is used
    /// as-is.
    pub fn sheet_title(&self) -> &str {
        match self {
            MetricKey::Percentiles1 => "50th Percentile",
            MetricKey::Percentiles2 => "75th Percentile",
            MetricKey::Percentiles3 => "95th Percentile",
            MetricKey::Percentiles4 => "99th Percentile",
            MetricKey::MinResponseTime
            | MetricKey::MaxResponseTime
            | MetricKey::MeanResponseTime
            | MetricKey::StandardDeviation
            | MetricKey::Other(_) => self.as_str(),
        }
    }

    /// The default metric list as an owned vector.
    pub fn defaults() -> Vec<MetricKey> {
        DEFAULT_METRICS.to_vec()
    }
}

impl From<&str> for MetricKey {
    fn from(key: &str) -> Self {
        match key {
            "minResponseTime" => MetricKey::MinResponseTime,
            "maxResponseTime" => MetricKey::MaxResponseTime,
            "meanResponseTime" => MetricKey::MeanResponseTime,
            "percentiles1" => MetricKey::Percentiles1,
            "percentiles2" => MetricKey::Percentiles2,
            "percentiles3" => MetricKey::Percentiles3,
            "percentiles4" => MetricKey::Percentiles4,
            "standardDeviation" => MetricKey::StandardDeviation,
            other => MetricKey::Other(other.to_string()),
        }
    }
}

impl FromStr for MetricKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MetricKey::from(s))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MetricKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(MetricKey::from(raw.as_str()))
    }
}
