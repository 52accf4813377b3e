use serde::{Deserialize, Serialize};

// ── Estimation service wire types ──

/// EWMA decay used by the prices endpoint when the request omits it
pub const DEFAULT_LAMBDA: f64 = 0.94;

fn default_lambda() -> f64 {
    DEFAULT_LAMBDA
}

/// Body of `POST /calc/volatility`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsRequest {
    pub returns: Vec<f64>,
    #[serde(rename = "lambda_")]
    pub lambda: f64,
}

/// Body of `POST /calc/volatility_from_prices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricesRequest {
    pub prices: Vec<f64>,
    #[serde(rename = "lambda_", default = "default_lambda")]
    pub lambda: f64,
}

/// Response of either estimation endpoint. Every field is optional: a missing
/// or `null` value means "unavailable", which is not the same as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    #[serde(default)]
    pub hist_vol: Option<f64>,
    #[serde(default)]
    pub ewma_vol: Option<f64>,
    /// Only reported by the prices endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_returns: Option<usize>,
}

impl Estimate {
    #[inline]
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.hist_vol.is_some() || self.ewma_vol.is_some()
    }
}

/// Error body shape used by the service (`{"detail": "..."}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
