use super::types::{PricesRequest, ReturnsRequest};
use crate::errors::{AppError, AppResult};
use crate::input::coerce_number;
use crate::state::Mode;
use serde::Serialize;

/// Estimation request. The variant decides both the JSON key holding the
/// series (`returns` / `prices`) and the endpoint it is posted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VolatilityRequest {
    Returns(ReturnsRequest),
    Prices(PricesRequest),
}

impl VolatilityRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Returns(_) => "/calc/volatility",
            Self::Prices(_) => "/calc/volatility_from_prices",
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Returns(_) => Mode::Returns,
            Self::Prices(_) => Mode::Prices,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Returns(r) => r.returns.len(),
            Self::Prices(p) => p.prices.len(),
        }
    }
}

/// Coerce the free-form lambda field. No range check: the service owns that.
pub fn parse_lambda(text: &str) -> AppResult<f64> {
    coerce_number(text).ok_or_else(|| AppError::InvalidLambda(text.trim().to_string()))
}

/// Build the request for `mode`. Callers must not pass an empty series;
/// doing so is reported as `EmptySeries` rather than sent.
pub fn build_request(mode: Mode, series: &[f64], lambda: f64) -> AppResult<VolatilityRequest> {
    if series.is_empty() {
        return Err(AppError::EmptySeries);
    }
    let series = series.to_vec();
    Ok(match mode {
        Mode::Returns => VolatilityRequest::Returns(ReturnsRequest { returns: series, lambda }),
        Mode::Prices => VolatilityRequest::Prices(PricesRequest { prices: series, lambda }),
    })
}
