/// Labeled SMA/EMA snapshot computed for chat replies
///
/// Bundles the latest moving-average values over a fixed set of window
/// lengths, keeping label order stable so replies render deterministically.
use super::moving_average::{calculate_ema, calculate_sma};

/// Window lengths computed for every `/indicator` request
pub const DEFAULT_WINDOWS: [usize; 8] = [5, 10, 14, 21, 34, 50, 100, 200];

/// Latest indicator values for one close-price series.
///
/// Entries keep `SMA_L`/`EMA_L` interleaved per window. `None` marks a window
/// longer than the available history.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    entries: Vec<(String, Option<f64>)>,
}

impl IndicatorSet {
    /// Labeled values in computation order
    pub fn entries(&self) -> &[(String, Option<f64>)] {
        &self.entries
    }

    /// Value for a label like `SMA_14`, if that label was computed
    pub fn value(&self, label: &str) -> Option<Option<f64>> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the trailing SMA and EMA of `closes` for each window length
pub fn compute_indicators(closes: &[f64], windows: &[usize]) -> IndicatorSet {
    let mut entries = Vec::with_capacity(windows.len() * 2);

    for &window in windows {
        entries.push((format!("SMA_{}", window), calculate_sma(closes, window)));
        entries.push((format!("EMA_{}", window), calculate_ema(closes, window)));
    }

    IndicatorSet { entries }
}
