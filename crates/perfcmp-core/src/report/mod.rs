pub mod io;

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{PerfCmpError, MISSING_ENTRY};
use crate::metric::MetricKey;

pub use io::read_report;

// ---------------------------------------------------------------------------
// PerformanceReport
// ---------------------------------------------------------------------------

/// One performance-test execution, as written by the load-testing tool.
///
/// The root node holds the aggregate stats; `contents` holds one node per
/// request or group, in the order the report declares them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerformanceReport {
    #[serde(default)]
    pub name: Option<String>,
    pub stats: ReportStats,
    #[serde(default, deserialize_with = "ordered_sections")]
    pub contents: Vec<(String, PerformanceReport)>,
}

impl PerformanceReport {
    pub fn from_json_str(json: &str) -> Result<Self, PerfCmpError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, PerfCmpError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Look up a direct child section by its `contents` key.
    pub fn section(&self, key: &str) -> Option<&PerformanceReport> {
        self.contents
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Label used for this node's row: the stats name, then the node name.
    pub fn label(&self) -> &str {
        self.stats
            .name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

/// Deserialize a JSON object into `(key, value)` pairs without losing the
/// key order.
fn ordered_sections<'de, D>(deserializer: D) -> Result<Vec<(String, PerformanceReport)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SectionsVisitor;

    impl<'de> Visitor<'de> for SectionsVisitor {
        type Value = Vec<(String, PerformanceReport)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of section name to report node")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sections: Vec<(String, PerformanceReport)> =
                Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, node)) = map.next_entry::<String, PerformanceReport>()? {
                // Duplicate keys: last one wins, first position is kept.
                if let Some(slot) = sections.iter_mut().find(|entry| entry.0 == key) {
                    slot.1 = node;
                } else {
                    sections.push((key, node));
                }
            }
            Ok(sections)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(SectionsVisitor)
}

// ---------------------------------------------------------------------------
// ReportStats / MetricValue
// ---------------------------------------------------------------------------

/// The `stats` object of a report node.
///
/// Besides the optional `name`, every entry is kept raw; metric entries are
/// only interpreted when a comparison asks for them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportStats {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub entries: Map<String, Value>,
}

/// Values of one metric under successful (`ok`) and failed (`ko`) samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValue {
    pub ok: f64,
    pub ko: f64,
}

impl ReportStats {
    /// Extract the `ok`/`ko` pair for `metric`.
    ///
    /// Numbers are accepted as JSON numbers or numeric strings (the
    /// JavaScript flavour of the report writes them quoted).
    pub fn metric(&self, metric: &MetricKey) -> Result<MetricValue, PerfCmpError> {
        let key = metric.as_str();
        let entry = self
            .entries
            .get(key)
            .and_then(Value::as_object)
            .ok_or_else(|| PerfCmpError::missing(key, MISSING_ENTRY))?;

        let field = |name: &str| -> Result<f64, PerfCmpError> {
            entry
                .get(name)
                .and_then(numeric)
                .ok_or_else(|| PerfCmpError::missing(key, name))
        };

        Ok(MetricValue {
            ok: field("ok")?,
            ko: field("ko")?,
        })
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
