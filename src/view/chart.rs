use super::domain::{compute_domain, AxisDomain};
use super::format::{format_kpi, format_value, series_label};
use crate::state::{Mode, Phase, ViewState};
use std::fmt::Write;

const Y_TICKS: usize = 5;
const PLOT_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChartPoint {
    /// Positional tick: t1, t2, ...
    pub label: String,
    pub value: f64,
    pub display: String,
}

/// Everything the front end draws. Derived from `ViewState`, never mutated
/// on its own.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChartView {
    pub mode: Mode,
    pub phase: Phase,
    pub series_label: &'static str,
    pub text_input: String,
    pub lambda_input: String,
    pub points: Vec<ChartPoint>,
    pub domain: AxisDomain,
    pub y_ticks: Vec<String>,
    pub hist_vol: String,
    pub ewma_vol: String,
    pub n_returns: Option<usize>,
    pub error: Option<String>,
}

pub fn chart_points(series: &[f64], mode: Mode) -> Vec<ChartPoint> {
    series
        .iter()
        .enumerate()
        .map(|(i, &value)| ChartPoint {
            label: format!("t{}", i + 1),
            value,
            display: format_value(value, mode),
        })
        .collect()
}

impl ChartView {
    pub fn project(state: &ViewState) -> Self {
        let domain = compute_domain(&state.series, state.mode);
        Self {
            mode: state.mode,
            phase: state.phase,
            series_label: series_label(state.mode),
            text_input: state.text_input.clone(),
            lambda_input: state.lambda_input.clone(),
            points: chart_points(&state.series, state.mode),
            domain,
            y_ticks: domain
                .ticks(Y_TICKS)
                .into_iter()
                .map(|t| format_value(t, state.mode))
                .collect(),
            hist_vol: format_kpi(state.estimate.hist_vol),
            ewma_vol: format_kpi(state.estimate.ewma_vol),
            n_returns: state.estimate.n_returns,
            error: state.error.as_ref().map(|e| e.to_string()),
        }
    }

    /// Plain-text rendering for the console front end.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "── Volatility Calculator [{} | {}] ──", self.mode, self.phase);
        let _ = writeln!(out, "{}s: {}", self.series_label, self.text_input);
        let _ = writeln!(out, "Lambda: {}", self.lambda_input);

        match self.domain {
            AxisDomain::Fixed { .. } => {
                let _ = writeln!(out, "Y axis: {}", self.y_ticks.join("  "));
                let label_width = self.points.iter().map(|p| p.label.len()).max().unwrap_or(2);
                let value_width = self.points.iter().map(|p| p.display.len()).max().unwrap_or(0);
                for p in &self.points {
                    let _ = writeln!(
                        out,
                        "{:>lw$} {:>vw$} |{}|",
                        p.label,
                        p.display,
                        plot_row(self.domain.position(p.value).unwrap_or(0.5)),
                        lw = label_width,
                        vw = value_width,
                    );
                }
            }
            AxisDomain::Auto => {
                let _ = writeln!(out, "(no data)");
            }
        }

        let _ = writeln!(out, "Historical Volatility (σ): {}", self.hist_vol);
        let _ = writeln!(out, "EWMA Volatility:           {}", self.ewma_vol);
        if let Some(n) = self.n_returns {
            let _ = writeln!(out, "Returns used:              {n}");
        }
        if let Some(err) = &self.error {
            let _ = writeln!(out, "Error: {err}");
        }
        out
    }
}

fn plot_row(frac: f64) -> String {
    let col = (frac * (PLOT_WIDTH - 1) as f64).round() as usize;
    (0..PLOT_WIDTH).map(|i| if i == col { '●' } else { ' ' }).collect()
}
