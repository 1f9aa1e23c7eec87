///! Prometheus exposition of collected observations
///!
///! Observations are grouped into metric families by name and encoded in the
///! text format together with the exporter's own registry (collector
///! durations, process metrics).

use std::collections::BTreeMap;

use prometheus::proto::{self, LabelPair, MetricFamily};
use prometheus::{Encoder, Histogram, HistogramOpts, HistogramVec, Registry, TextEncoder};
use tracing::warn;

use crate::error::Result;
use crate::metric::{MetricType, Observation};

pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

const DURATION_BUCKETS: [f64; 8] = [0.1, 0.2, 0.4, 1.0, 3.0, 8.0, 20.0, 60.0];

/// Process-lifetime registry plus the encoder for scrape results
pub struct Exposition {
    registry: Registry,
    collector_duration: HistogramVec,
}

impl Exposition {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let collector_duration = HistogramVec::new(
            HistogramOpts::new("ovirt_collectors_duration", "Histogram of latencies for metric collectors.")
                .buckets(DURATION_BUCKETS.to_vec()),
            &["collector"],
        )?;
        registry.register(Box::new(collector_duration.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

        Ok(Self {
            registry,
            collector_duration,
        })
    }

    /// Duration histogram for one collector
    pub fn collector_duration(&self, collector: &str) -> Histogram {
        self.collector_duration.with_label_values(&[collector])
    }

    /// Text exposition of `observations` followed by the exporter's own metrics
    pub fn encode(&self, observations: &[Observation]) -> Result<String> {
        let mut families = metric_families(observations);
        families.extend(self.registry.gather());

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Group observations into families, ordered by metric name
///
/// An observation whose type disagrees with the first one seen under the
/// same name is dropped.
pub fn metric_families(observations: &[Observation]) -> Vec<MetricFamily> {
    let mut families: BTreeMap<&str, MetricFamily> = BTreeMap::new();

    for observation in observations {
        let desc = &observation.desc;
        let field_type = match desc.metric_type {
            MetricType::Gauge => proto::MetricType::GAUGE,
            MetricType::Counter => proto::MetricType::COUNTER,
        };

        let family = families.entry(desc.name.as_str()).or_insert_with(|| {
            let mut family = MetricFamily::default();
            family.set_name(desc.name.clone());
            family.set_help(desc.help.clone());
            family.set_field_type(field_type);
            family
        });

        if family.get_field_type() != field_type {
            warn!(
                "Dropping {} sample of {}: already exported as {:?}",
                desc.metric_type.as_str(),
                desc.name,
                family.get_field_type()
            );
            continue;
        }

        family.mut_metric().push(to_metric(observation));
    }

    families.into_values().collect()
}

fn to_metric(observation: &Observation) -> proto::Metric {
    let mut metric = proto::Metric::default();

    for (name, value) in observation.desc.label_names.iter().zip(&observation.label_values) {
        let mut pair = LabelPair::default();
        pair.set_name(name.clone());
        pair.set_value(value.clone());
        metric.mut_label().push(pair);
    }

    match observation.desc.metric_type {
        MetricType::Gauge => {
            let mut gauge = proto::Gauge::default();
            gauge.set_value(observation.value);
            metric.set_gauge(gauge);
        }
        MetricType::Counter => {
            let mut counter = proto::Counter::default();
            counter.set_value(observation.value);
            metric.set_counter(counter);
        }
    }

    metric
}
