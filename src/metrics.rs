use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Encoder, Histogram, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    // Request metrics
    pub static ref READ_REQUESTS: IntCounter = register_int_counter!(
        "remote_read_requests_total",
        "Total number of remote read requests received"
    ).unwrap();

    pub static ref READ_FAILURES: IntCounterVec = register_int_counter_vec!(
        "remote_read_failures_total",
        "Total number of failed remote read requests by pipeline stage",
        &["stage"]
    ).unwrap();

    pub static ref REQUEST_DURATION: Histogram = register_histogram!(
        "remote_read_request_duration_seconds",
        "Remote read request duration in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 15.0]
    ).unwrap();

    pub static ref SERIES_RETURNED: IntCounter = register_int_counter!(
        "remote_read_series_returned_total",
        "Total number of time series returned to remote read clients"
    ).unwrap();

    // Backend metrics
    pub static ref BACKEND_INVOKE_DURATION: HistogramVec = register_histogram_vec!(
        "backend_invoke_duration_seconds",
        "Backend function invocation duration in seconds",
        &["outcome"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 15.0]
    ).unwrap();
}

/// Forces registration so every metric shows up on the first scrape.
pub fn init_metrics() {
    lazy_static::initialize(&READ_REQUESTS);
    lazy_static::initialize(&READ_FAILURES);
    lazy_static::initialize(&REQUEST_DURATION);
    lazy_static::initialize(&SERIES_RETURNED);
    lazy_static::initialize(&BACKEND_INVOKE_DURATION);
}

pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn new() -> Self {
        READ_REQUESTS.inc();
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REQUEST_DURATION.observe(duration);
    }
}

pub fn record_failure(stage: &str) {
    READ_FAILURES.with_label_values(&[stage]).inc();
}

pub fn record_series_returned(count: usize) {
    SERIES_RETURNED.inc_by(count as u64);
}

/// Renders the default registry in the text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
