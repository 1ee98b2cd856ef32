//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    invites_sent_total: IntCounter,
    invites_redeemed_total: IntCounter,
    webhooks_processed_total: IntCounterVec,
    schools_expired_total: IntCounter,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let tracked = metrics().is_some_and(|metrics| {
            metrics.requests_in_flight.inc();
            true
        });

        Self { tracked }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Business counters bumped by handlers and the scheduler.
pub(crate) mod counters {
    use super::metrics;

    pub(crate) fn invites_sent(count: usize) {
        if let Some(metrics) = metrics() {
            metrics
                .invites_sent_total
                .inc_by(u64::try_from(count).unwrap_or(u64::MAX));
        }
    }

    pub(crate) fn invite_redeemed() {
        if let Some(metrics) = metrics() {
            metrics.invites_redeemed_total.inc();
        }
    }

    /// `outcome` is one of `recorded`, `ignored`, `rejected`.
    pub(crate) fn webhook_processed(outcome: &str) {
        if let Some(metrics) = metrics() {
            metrics
                .webhooks_processed_total
                .with_label_values(&[outcome])
                .inc();
        }
    }

    pub(crate) fn schools_expired(count: u64) {
        if let Some(metrics) = metrics() {
            metrics.schools_expired_total.inc_by(count);
        }
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| match build_metrics() {
            Ok(metrics) => Some(metrics),
            Err(source) => {
                error!("failed to build metrics registry: {source}");
                None
            }
        })
        .as_ref()
}

fn build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new_custom(Some("scholarlink_json".to_string()), None)?;

    let requests_total = IntCounterVec::new(
        Opts::new(
            "http_requests_total",
            "Total HTTP requests partitioned by method, route, and status code.",
        ),
        &["method", "route", "status_code"],
    )?;

    let request_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds partitioned by method and route.",
        )
        .buckets(vec![
            0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "route"],
    )?;

    let requests_in_flight = IntGauge::with_opts(Opts::new(
        "http_requests_in_flight",
        "Current number of in-flight HTTP requests.",
    ))?;

    let invites_sent_total =
        IntCounter::with_opts(Opts::new("invites_sent_total", "Invites persisted and emailed."))?;

    let invites_redeemed_total = IntCounter::with_opts(Opts::new(
        "invites_redeemed_total",
        "Invites exchanged for an activated account.",
    ))?;

    let webhooks_processed_total = IntCounterVec::new(
        Opts::new(
            "payment_webhooks_processed_total",
            "Payment webhook deliveries partitioned by outcome.",
        ),
        &["outcome"],
    )?;

    let schools_expired_total = IntCounter::with_opts(Opts::new(
        "schools_expired_total",
        "Schools flipped to unpaid by the expiry sweep.",
    ))?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration_seconds.clone()))?;
    registry.register(Box::new(requests_in_flight.clone()))?;
    registry.register(Box::new(invites_sent_total.clone()))?;
    registry.register(Box::new(invites_redeemed_total.clone()))?;
    registry.register(Box::new(webhooks_processed_total.clone()))?;
    registry.register(Box::new(schools_expired_total.clone()))?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        invites_sent_total,
        invites_redeemed_total,
        webhooks_processed_total,
        schools_expired_total,
    })
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };

    use super::{counters, metrics_handler, observe_request};

    #[tokio::test]
    async fn metrics_endpoint_exposes_http_and_domain_metrics() {
        observe_request("GET", "/courses", 200, 0.042);
        observe_request("POST", "/invite/create", 500, 0.123);
        counters::invites_sent(3);
        counters::webhook_processed("recorded");
        counters::schools_expired(2);

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let response = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await
            .unwrap_or_default();

        for name in [
            "scholarlink_json_http_requests_total",
            "scholarlink_json_http_request_duration_seconds",
            "scholarlink_json_http_requests_in_flight",
            "scholarlink_json_invites_sent_total",
            "scholarlink_json_payment_webhooks_processed_total{outcome=\"recorded\"}",
            "scholarlink_json_schools_expired_total",
        ] {
            assert!(response.contains(name), "expected {name} in metrics output");
        }
    }
}
