///! Statistic samples reported under `.../statistics`

use serde::{Deserialize, Serialize};

/// Response of `GET {resource}/statistics`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "statistic", default)]
    pub statistics: Vec<Statistic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistic {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: String,
    /// Value type: decimal, integer, string, ...
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub values: StatisticValues,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticValues {
    #[serde(rename = "value", default)]
    pub values: Vec<StatisticValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticValue {
    #[serde(default)]
    pub datum: Option<f64>,
}

/// How a sample is exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticKind {
    Gauge,
    Counter,
}

impl Statistic {
    /// Classify the sample, `None` for anything that is not a numeric gauge or counter
    pub fn classify(&self) -> Option<StatisticKind> {
        if !self.is_numeric() {
            return None;
        }

        match self.kind.as_str() {
            "gauge" => Some(StatisticKind::Gauge),
            "counter" => Some(StatisticKind::Counter),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.value_type.as_str(), "decimal" | "integer")
    }

    /// First reported datum
    pub fn datum(&self) -> Option<f64> {
        self.values.values.first().and_then(|v| v.datum)
    }
}
