use crate::state::Mode;

/// Shown for a KPI with no value. Must never read as zero.
pub const UNAVAILABLE: &str = "—";

/// Format a series value: fixed-point for prices, percent for returns.
/// Used for axis ticks, per-point values and tooltips alike.
pub fn format_value(value: f64, mode: Mode) -> String {
    match mode {
        Mode::Prices => format!("{:.2}", normalize_zero(value)),
        Mode::Returns => {
            // saturate rather than print `inf%` for finite input near f64::MAX
            let pct = if value.is_finite() {
                (value * 100.0).clamp(f64::MIN, f64::MAX)
            } else {
                value * 100.0
            };
            format!("{:.2}%", normalize_zero(pct))
        }
    }
}

/// Volatility outputs share the input series' units, so no percent scaling.
pub fn format_kpi(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", normalize_zero(v)),
        _ => UNAVAILABLE.to_string(),
    }
}

/// Legend name of the series line.
pub fn series_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Returns => "Return",
        Mode::Prices => "Price",
    }
}

#[inline]
fn normalize_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}
