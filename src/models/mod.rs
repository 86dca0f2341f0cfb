use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC bucket of broker midpoint prices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Candle history for one instrument at one granularity.
///
/// Candles are always held in ascending time order, so the last entry is the
/// most recent close and `closes()` can feed the indicator math directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub instrument: String,
    pub granularity: String,
    candles: Vec<Candle>,
}

impl PriceSeries {
    /// Build a series, sorting the candles ascending by timestamp.
    pub fn new(instrument: String, granularity: String, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        Self {
            instrument,
            granularity,
            candles,
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Close prices in time order
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Most recent candle, if any
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// One entry of the instrument list the `/price` command walks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub symbol: String,
}
