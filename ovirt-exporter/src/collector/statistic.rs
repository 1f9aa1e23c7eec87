///! Statistic samples to labeled observations
///!
///! `hosts/{id}/statistics`, `vms/{id}/statistics` and the per-NIC statistic
///! collections share one format; this module turns their numeric gauges and
///! counters into observations.

use ovirt_common::{Statistic, StatisticKind, Statistics};
use tracing::error;

use super::fanout::Recorder;
use super::CollectorContext;
use crate::metric::{Labels, MetricDesc, MetricType, Observation};

/// Fetch `path` and record one observation per usable sample
///
/// A failed fetch is logged and contributes nothing.
pub async fn collect(ctx: &CollectorContext, recorder: &Recorder, path: &str, prefix: &str, labels: &Labels) {
    let stats: Statistics = match ctx.fetch(path).await {
        Ok(stats) => stats,
        Err(e) => {
            error!(path = %path, error = %e, "Failed to fetch statistics");
            return;
        }
    };

    let observations: Vec<Observation> = stats
        .statistics
        .iter()
        .filter_map(|s| convert(s, prefix, labels))
        .collect();
    recorder.record_all(observations).await;
}

/// Observation for one sample, `None` if the sample is not exported
pub fn convert(stat: &Statistic, prefix: &str, labels: &Labels) -> Option<Observation> {
    let kind = stat.classify()?;
    let value = stat.datum()?;

    let metric_type = match kind {
        StatisticKind::Gauge => MetricType::Gauge,
        StatisticKind::Counter => MetricType::Counter,
    };
    let name = metric_name(prefix, &stat.name, &stat.unit, metric_type);
    let desc = MetricDesc::new(name, stat.description.clone(), metric_type, labels.names.clone());

    Some(Observation::new(&desc, value, labels.values.clone()))
}

/// `prefix` + sample name with dots as underscores + unit suffix
pub fn metric_name(prefix: &str, stat_name: &str, unit: &str, metric_type: MetricType) -> String {
    let mut name = format!("{}{}", prefix, stat_name.replace('.', "_"));
    if unit != "none" {
        name.push('_');
        name.push_str(unit);
    }

    match metric_type {
        MetricType::Counter => counter_name(&name),
        MetricType::Gauge => name,
    }
}

/// Counter names end in exactly one `_total`, wherever the source put it
pub fn counter_name(name: &str) -> String {
    let mut base = name.to_string();
    while base.contains("_total") {
        base = base.replace("_total", "");
    }
    format!("{}_total", base)
}
