/// Calculate Simple Moving Average over the trailing `period` prices
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Calculate Exponential Moving Average with smoothing `2 / (period + 1)`.
///
/// Seeded with the simple average of the first `period` prices, then folded
/// over every later price, so exactly `period` prices yield the seed itself.
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed with the SMA of the oldest `period` prices
    let mut ema = prices[..period].iter().sum::<f64>() / period as f64;

    for price in &prices[period..] {
        ema = (price - ema) * multiplier + ema;
    }

    Some(ema)
}
