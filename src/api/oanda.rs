use crate::models::{Candle, PriceSeries};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const OANDA_API_BASE: &str = "https://api-fxtrade.oanda.com/v3";
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Client for the OANDA v3 candle endpoint
///
/// Authenticates with a bearer token and fetches midpoint OHLC history per
/// instrument. Granularities use the broker's notation (M1, H4, D, ...).
#[derive(Clone)]
pub struct OandaClient {
    client: Client,
    api_base: String,
    api_token: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    #[serde(default)]
    candles: Vec<CandleRaw>,
}

#[derive(Debug, Deserialize)]
struct CandleRaw {
    time: DateTime<Utc>,
    mid: Option<MidRaw>,
}

/// Midpoint prices, serialized by the broker as decimal strings
#[derive(Debug, Deserialize)]
struct MidRaw {
    o: String,
    h: String,
    l: String,
    c: String,
}

impl CandleRaw {
    fn into_candle(self) -> Result<Candle, MarketDataError> {
        let mid = self
            .mid
            .ok_or_else(|| MarketDataError::Malformed("candle missing mid prices".to_string()))?;

        Ok(Candle {
            timestamp: self.time,
            open: parse_price(&mid.o)?,
            high: parse_price(&mid.h)?,
            low: parse_price(&mid.l)?,
            close: parse_price(&mid.c)?,
        })
    }
}

fn parse_price(raw: &str) -> Result<f64, MarketDataError> {
    raw.parse()
        .map_err(|_| MarketDataError::Malformed(format!("unparsable price {:?}", raw)))
}

// ============== Errors ==============

/// Why a candle fetch produced no series.
///
/// All of these are expected outcomes for callers (unknown symbol, closed
/// market, broker hiccup) and map to reply text, never to a crash.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("broker returned no candles")]
    NoData,
    #[error("candle request rejected with status {0}")]
    Status(StatusCode),
    #[error("candle request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed candle payload: {0}")]
    Malformed(String),
}

impl MarketDataError {
    /// True when the broker answered cleanly but had nothing for the symbol
    pub fn is_no_data(&self) -> bool {
        matches!(self, MarketDataError::NoData)
    }
}

// ============== Implementation ==============

impl OandaClient {
    pub fn new(api_token: String) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: OANDA_API_BASE.to_string(),
            api_token,
        })
    }

    /// Point the client at another base URL (practice endpoint, tests)
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    /// Fetch up to `count` candles for one instrument.
    /// Endpoint: GET /instruments/{symbol}/candles?count={count}&granularity={granularity}
    ///
    /// The result is sorted ascending by timestamp. An empty candle list maps
    /// to [`MarketDataError::NoData`] so callers can tell "no history" apart
    /// from a failed request.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        granularity: &str,
        count: u32,
    ) -> Result<PriceSeries, MarketDataError> {
        let url = format!(
            "{}/instruments/{}/candles?count={}&granularity={}",
            self.api_base, symbol, count, granularity
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status(status));
        }

        let body: CandlesResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::Malformed(e.to_string()))?;

        if body.candles.is_empty() {
            return Err(MarketDataError::NoData);
        }

        let mut candles = Vec::with_capacity(body.candles.len());
        for raw in body.candles {
            candles.push(raw.into_candle()?);
        }

        Ok(PriceSeries::new(
            symbol.to_string(),
            granularity.to_string(),
            candles,
        ))
    }
}
