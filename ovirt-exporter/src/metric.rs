///! Metric descriptors and labeled observations
///!
///! Collectors produce a flat list of `Observation`s. Each one points at a
///! shared `MetricDesc` whose label names are fixed; only the values vary.

use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// Name, help, type and ordered label names of a metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub label_names: Vec<String>,
}

impl MetricDesc {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        metric_type: MetricType,
        label_names: Vec<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            help: help.into(),
            metric_type,
            label_names,
        })
    }

    pub fn gauge(name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Arc<Self> {
        Self::new(name, help, MetricType::Gauge, to_owned(label_names))
    }
}

/// One sample: a descriptor, a value and label values in descriptor order
#[derive(Debug, Clone)]
pub struct Observation {
    pub desc: Arc<MetricDesc>,
    pub value: f64,
    pub label_values: Vec<String>,
}

impl Observation {
    pub fn new(desc: &Arc<MetricDesc>, value: f64, label_values: Vec<String>) -> Self {
        debug_assert_eq!(
            desc.label_names.len(),
            label_values.len(),
            "label values do not match {}",
            desc.name
        );

        Self {
            desc: Arc::clone(desc),
            value,
            label_values,
        }
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    /// Value of the label called `name`
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .label_names
            .iter()
            .position(|l| l == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

/// Label names with their values for one resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    pub names: Vec<String>,
    pub values: Vec<String>,
}

impl Labels {
    pub fn new(names: &[&str], values: Vec<String>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self {
            names: to_owned(names),
            values,
        }
    }

    /// Copy of these labels with one more pair appended
    pub fn with(&self, name: &str, value: impl Into<String>) -> Self {
        let mut labels = self.clone();
        labels.names.push(name.to_string());
        labels.values.push(value.into());
        labels
    }
}

/// Distinct descriptors of an observation set, in first-seen order
pub fn descriptors(observations: &[Observation]) -> Vec<Arc<MetricDesc>> {
    let mut seen = HashSet::new();
    observations
        .iter()
        .filter(|o| seen.insert(o.desc.name.clone()))
        .map(|o| Arc::clone(&o.desc))
        .collect()
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
