use crate::state::Mode;

/// Prices: relative pad on the range, floored by a fraction of the magnitude
const PRICE_RANGE_PAD: f64 = 0.02;
const PRICE_MAGNITUDE_PAD: f64 = 0.0005;

/// Returns: wider relative pad plus an absolute floor for near-flat series
const RETURN_RANGE_PAD: f64 = 0.10;
const RETURN_MIN_PAD: f64 = 0.001;

/// Y-axis bounds. `Auto` leaves scaling to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AxisDomain {
    Auto,
    Fixed { min: f64, max: f64 },
}

impl AxisDomain {
    /// Where `value` sits between min (0.0) and max (1.0), clamped.
    /// Works on halves so bounds near `f64::MAX` do not overflow.
    pub fn position(&self, value: f64) -> Option<f64> {
        match *self {
            Self::Auto => None,
            Self::Fixed { min, max } => {
                let half_span = max / 2.0 - min / 2.0;
                if half_span > 0.0 {
                    Some(((value / 2.0 - min / 2.0) / half_span).clamp(0.0, 1.0))
                } else {
                    Some(0.5)
                }
            }
        }
    }

    /// `n` evenly spaced values from min to max inclusive. Empty for `Auto`.
    pub fn ticks(&self, n: usize) -> Vec<f64> {
        match *self {
            Self::Auto => Vec::new(),
            Self::Fixed { min, max } => match n {
                0 => Vec::new(),
                1 => vec![min / 2.0 + max / 2.0],
                _ => (0..n)
                    .map(|i| {
                        let t = i as f64 / (n - 1) as f64;
                        min * (1.0 - t) + max * t
                    })
                    .collect(),
            },
        }
    }
}

/// Padded axis domain for a series. Pure function.
pub fn compute_domain(series: &[f64], mode: Mode) -> AxisDomain {
    if series.is_empty() {
        return AxisDomain::Auto;
    }

    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    // half the range, so a spread wider than f64::MAX stays finite
    let half_range = max / 2.0 - min / 2.0;

    let pad = match mode {
        Mode::Prices => {
            let magnitude = max.abs().max(min.abs()).max(1.0);
            (half_range * (2.0 * PRICE_RANGE_PAD)).max(magnitude * PRICE_MAGNITUDE_PAD)
        }
        Mode::Returns => (half_range * (2.0 * RETURN_RANGE_PAD)).max(RETURN_MIN_PAD),
    };

    AxisDomain::Fixed {
        min: (min - pad).max(f64::MIN),
        max: (max + pad).min(f64::MAX),
    }
}
