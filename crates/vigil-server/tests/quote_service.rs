//! quote-service instrumentation with a fake market-data source.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::util::ServiceExt;

use vigil_core::error::{Result, VigilError};
use vigil_core::metrics::Registry;
use vigil_server::app_state::QuoteState;
use vigil_server::backend::{Quote, QuoteSource};
use vigil_server::router::quote_router;
use vigil_server::services::quote::ChaosDelay;

/// Knows one symbol; everything else fails like an unknown ticker.
struct FakeQuotes;

#[async_trait]
impl QuoteSource for FakeQuotes {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        match symbol {
            "aapl" | "AAPL" => Ok(Quote {
                price: 189.256,
                previous_close: 187.5,
            }),
            _ => Err(VigilError::Backend(format!("no data for {symbol}"))),
        }
    }
}

fn setup() -> (Router, QuoteState) {
    let chaos = ChaosDelay::new(Duration::from_millis(10), Duration::from_millis(20));
    let state = QuoteState::new(
        Arc::new(Registry::new()),
        Arc::new(FakeQuotes),
        chaos,
        &[0.005, 0.01, 0.1, 1.0],
    )
    .unwrap();
    (quote_router(state.clone()), state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn quote_success_is_rounded_and_uppercased() {
    let (app, state) = setup();

    let resp = app.oneshot(get("/stock/aapl")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["symbol"], "AAPL");
    assert_eq!(v["price"], 189.26);
    assert_eq!(v["change"], 1.76);

    let m = state.metrics();
    assert_eq!(m.requests.value(&[]).unwrap(), 1.0);
    assert_eq!(m.errors.value(&[]).unwrap(), 0.0);
    assert_eq!(m.latency.count(), 1);
}

#[tokio::test]
async fn failed_lookup_observes_latency_exactly_once() {
    let (app, state) = setup();

    let resp = app.oneshot(get("/stock/NOPE")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["detail"], "Stock fetch failed");

    let m = state.metrics();
    assert_eq!(m.requests.value(&[]).unwrap(), 1.0);
    assert_eq!(m.errors.value(&[]).unwrap(), 1.0);
    assert_eq!(m.latency.count(), 1);
}

#[tokio::test]
async fn chaos_toggle_delays_requests_inside_the_timer() {
    let (app, state) = setup();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chaos/delay?enable=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["delay_enabled"], true);
    assert!(state.chaos().is_enabled());

    let resp = app.clone().oneshot(get("/stock/AAPL")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(state.metrics().latency.sum() >= 0.01);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chaos/delay?enable=false")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["delay_enabled"], false);
}

#[tokio::test]
async fn scrape_refreshes_live_gauges() {
    let (app, _state) = setup();
    app.clone().oneshot(get("/stock/AAPL")).await.unwrap();

    let resp = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec())
        .unwrap();

    for line in [
        "# TYPE api_requests_total counter\n",
        "api_requests_total 1\n",
        "api_errors_total 0\n",
        "api_response_latency_seconds_count 1\n",
        "# TYPE cpu_usage_percent gauge\n",
        "# TYPE memory_usage_percent gauge\n",
    ] {
        assert!(text.contains(line), "missing {line:?} in\n{text}");
    }

    let mem: f64 = text
        .lines()
        .find_map(|l| l.strip_prefix("memory_usage_percent "))
        .unwrap()
        .parse()
        .unwrap();
    assert!((0.0..=100.0).contains(&mem));
}
