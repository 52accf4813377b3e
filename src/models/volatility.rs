use crate::errors::{AppError, AppResult};
use crate::estimator::types::Estimate;
use statrs::statistics::Statistics;

/// Historical volatility: sample standard deviation (n - 1 denominator).
/// `None` when fewer than two returns make it undefined.
pub fn hist_vol(returns: &[f64]) -> Option<f64> {
    let sd = returns.iter().std_dev();
    sd.is_finite().then_some(sd)
}

/// EWMA volatility with weights `(1 - lambda) * lambda^i`, `i = 0` on the most
/// recent return. Weighted mean first, then the weighted variance around it,
/// both normalized by the weight sum.
pub fn ewma_vol(returns: &[f64], lambda: f64) -> AppResult<f64> {
    if returns.is_empty() {
        return Err(AppError::Calc("at least one return is required".into()));
    }

    // Weights in chronological order, built from the newest backwards
    let mut weights = vec![0.0; returns.len()];
    let mut w = 1.0 - lambda;
    for slot in weights.iter_mut().rev() {
        *slot = w;
        w *= lambda;
    }

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 || !weight_sum.is_finite() {
        return Err(AppError::Calc("weights sum to zero, cannot be normalized".into()));
    }

    let mean = returns.iter().zip(&weights).map(|(r, w)| r * w).sum::<f64>() / weight_sum;
    let variance = returns
        .iter()
        .zip(&weights)
        .map(|(r, w)| w * (r - mean) * (r - mean))
        .sum::<f64>()
        / weight_sum;

    Ok(variance.max(0.0).sqrt())
}

/// Log returns `ln(p_t / p_{t-1})`.
pub fn prices_to_returns(prices: &[f64]) -> AppResult<Vec<f64>> {
    if prices.len() < 2 {
        return Err(AppError::Calc("at least 2 prices are required".into()));
    }
    if let Some(bad) = prices.iter().find(|p| **p <= 0.0 || !p.is_finite()) {
        return Err(AppError::Calc(format!("prices must be positive, got {bad}")));
    }
    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

pub fn validate_lambda(lambda: f64) -> AppResult<()> {
    if !(0.0..=1.0).contains(&lambda) {
        return Err(AppError::InvalidInput(format!(
            "lambda_ must be between 0 and 1, got {lambda}"
        )));
    }
    Ok(())
}

pub fn estimate_from_returns(returns: &[f64], lambda: f64) -> AppResult<Estimate> {
    validate_lambda(lambda)?;
    let ewma = ewma_vol(returns, lambda)?;
    Ok(Estimate {
        hist_vol: hist_vol(returns),
        ewma_vol: Some(ewma),
        n_returns: None,
    })
}

pub fn estimate_from_prices(prices: &[f64], lambda: f64) -> AppResult<Estimate> {
    validate_lambda(lambda)?;
    let returns = prices_to_returns(prices)?;
    Ok(Estimate {
        n_returns: Some(returns.len()),
        ..estimate_from_returns(&returns, lambda)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hist_vol_sample_std() {
        let v = hist_vol(&[0.01, -0.01]).unwrap();
        assert!((v - 0.0002_f64.sqrt()).abs() < 1e-12, "got {v}");
    }

    #[test]
    fn test_hist_vol_undefined_for_one_return() {
        assert_eq!(hist_vol(&[0.01]), None);
        assert_eq!(hist_vol(&[]), None);
    }

    #[test]
    fn test_ewma_hand_computed() {
        // weights: 0.25 on 0.01, 0.5 on 0.03 (most recent)
        let v = ewma_vol(&[0.01, 0.03], 0.5).unwrap();
        let expected = (8.0e-5_f64 / 0.9).sqrt();
        assert!((v - expected).abs() < 1e-12, "{v} vs {expected}");
    }

    #[test]
    fn test_ewma_constant_series_is_zero() {
        let v = ewma_vol(&[0.02; 10], 0.94).unwrap();
        assert!(v.abs() < 1e-12);
    }

    #[test]
    fn test_ewma_lambda_zero_uses_last_only() {
        assert_eq!(ewma_vol(&[0.5, -0.3, 0.01], 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_ewma_lambda_one_rejected() {
        assert!(matches!(ewma_vol(&[0.01, 0.02], 1.0), Err(AppError::Calc(_))));
    }

    #[test]
    fn test_ewma_empty_rejected() {
        assert!(matches!(ewma_vol(&[], 0.94), Err(AppError::Calc(_))));
    }

    #[test]
    fn test_ewma_reacts_to_recent_shock() {
        let mut calm = vec![0.001, -0.001, 0.001, -0.001, 0.001, -0.001];
        let base = ewma_vol(&calm, 0.94).unwrap();
        calm.push(0.05);
        let shocked = ewma_vol(&calm, 0.94).unwrap();
        assert!(shocked > base * 5.0, "{shocked} vs {base}");
    }

    #[test]
    fn test_prices_to_log_returns() {
        let r = prices_to_returns(&[100.0, 110.0, 99.0]).unwrap();
        assert_eq!(r.len(), 2);
        assert!((r[0] - 1.1_f64.ln()).abs() < 1e-12);
        assert!((r[1] - 0.9_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_prices_need_two_positive() {
        assert!(prices_to_returns(&[100.0]).is_err());
        assert!(prices_to_returns(&[100.0, 0.0]).is_err());
        assert!(prices_to_returns(&[100.0, -5.0]).is_err());
    }

    #[test]
    fn test_lambda_range() {
        assert!(validate_lambda(0.0).is_ok());
        assert!(validate_lambda(1.0).is_ok());
        assert!(matches!(validate_lambda(1.01), Err(AppError::InvalidInput(_))));
        assert!(validate_lambda(-0.1).is_err());
        assert!(validate_lambda(f64::NAN).is_err());
    }

    #[test]
    fn test_estimate_from_prices_counts_returns() {
        let e = estimate_from_prices(&[100.0, 101.0, 102.0, 101.5], 0.94).unwrap();
        assert_eq!(e.n_returns, Some(3));
        assert!(e.hist_vol.unwrap() > 0.0);
        assert!(e.ewma_vol.unwrap() > 0.0);
    }
}
