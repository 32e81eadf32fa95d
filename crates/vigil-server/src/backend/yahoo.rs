//! Yahoo Finance chart API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use vigil_core::error::{Result, VigilError};

use super::{Quote, QuoteSource};

const MAX_SYMBOL_LEN: usize = 16;

pub struct YahooQuotes {
    client: reqwest::Client,
    base_url: String,
}

impl YahooQuotes {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vigil/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VigilError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Tickers are short and drawn from a small alphabet (`BRK-B`, `^GSPC`, `EURUSD=X`).
pub(crate) fn validate_symbol(symbol: &str) -> Result<()> {
    let ok = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if ok {
        Ok(())
    } else {
        Err(VigilError::Backend(format!("invalid symbol: {symbol:?}")))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

fn parse_chart(body: &str) -> Result<Quote> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| VigilError::Backend(format!("malformed quote response: {e}")))?;
    if let Some(err) = resp.chart.error {
        return Err(VigilError::Backend(format!("upstream error: {}", err.description)));
    }
    let meta = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| VigilError::Backend("quote response has no result".into()))?;

    let price = meta
        .regular_market_price
        .ok_or_else(|| VigilError::Backend("quote has no market price".into()))?;
    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .ok_or_else(|| VigilError::Backend("quote has no previous close".into()))?;
    Ok(Quote {
        price,
        previous_close,
    })
}

#[async_trait]
impl QuoteSource for YahooQuotes {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        validate_symbol(symbol)?;
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let resp = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| VigilError::Backend(format!("quote request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| VigilError::Backend(format!("quote body read failed: {e}")))?;
        // Yahoo reports unknown symbols as 404 with a chart.error payload.
        match parse_chart(&body) {
            Ok(q) if status.is_success() => Ok(q),
            Ok(_) => Err(VigilError::Backend(format!("upstream status {status}"))),
            Err(e) => Err(e),
        }
    }
}
