use crate::models::BackendSeries;
use crate::proto::{Label, Sample, TimeSeries};
use crate::query::{
    ExtractedParams, FUNCTION_NAME_LABEL, METRIC_NAME_LABEL, TARGET_LABEL, TYPE_LABEL,
};

/// Converts backend series into remote-read time series.
///
/// Output order follows the backend: one series per backend target, samples in
/// datapoint order. Nothing is sorted, filtered or deduplicated. The `type`
/// label comes from the query, not from the backend series.
pub fn map_series(series: &[BackendSeries], params: &ExtractedParams) -> Vec<TimeSeries> {
    series
        .iter()
        .map(|serie| TimeSeries {
            labels: vec![
                Label::new(METRIC_NAME_LABEL, params.metric_name.as_str()),
                Label::new(FUNCTION_NAME_LABEL, params.function_name.as_str()),
                Label::new(TARGET_LABEL, serie.target.as_str()),
                Label::new(TYPE_LABEL, params.r#type.as_str()),
            ],
            samples: serie
                .datapoints
                .iter()
                .map(|point| Sample {
                    value: point.value() as f64,
                    timestamp: point.timestamp_ms(),
                })
                .collect(),
        })
        .collect()
}
