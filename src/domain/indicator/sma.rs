//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: the first (n-1) values are undefined (`None`). A zero period is
//! undefined everywhere.

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let warmup = period.saturating_sub(1);

    for i in 0..values.len() {
        if period == 0 || i < warmup {
            out.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        out.push(Some(window.iter().sum::<f64>() / period as f64));
    }

    out
}

/// SMA of the last `period` values only, or `None` when fewer are available.
pub fn trailing_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}
