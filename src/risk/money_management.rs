use thiserror::Error;

/// Dollar value of one pip for one standard lot, fixed across instruments
pub const DOLLARS_PER_PIP: f64 = 13.0;

/// Decimal places kept on a computed lot size
const LOT_PRECISION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LotSizeError {
    /// Stop-loss distance of zero or less would blow up the division
    #[error("stop-loss pips must be greater than zero")]
    NonPositiveStopLoss,
}

/// Position size for a margin balance, risk tolerance, and stop-loss distance.
///
/// Risks `margin_balance * risk_percentage / 100` dollars against a stop
/// `sl_pips` away at [`DOLLARS_PER_PIP`] per lot, rounded to three decimals.
pub fn lot_size(margin_balance: f64, risk_percentage: f64, sl_pips: i64) -> Result<f64, LotSizeError> {
    if sl_pips <= 0 {
        return Err(LotSizeError::NonPositiveStopLoss);
    }

    let risk_amount = margin_balance * risk_percentage / 100.0;
    let lots = risk_amount / (DOLLARS_PER_PIP * sl_pips as f64);

    let scale = 10f64.powi(LOT_PRECISION as i32);
    Ok((lots * scale).round() / scale)
}
