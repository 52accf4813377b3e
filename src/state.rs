use crate::errors::{AppError, AppResult};
use crate::estimator::request::VolatilityRequest;
use crate::estimator::types::Estimate;
use crate::input::text::parse_series;
use smallvec::SmallVec;
use std::path::PathBuf;

/// Series shown when the front end starts, before any edit
pub const INITIAL_TEXT: &str = "0.01,-0.02,0.015,0.005,-0.01,0.02";

// ── Interpretation mode ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Returns,
    Prices,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Returns => write!(f, "returns"),
            Self::Prices => write!(f, "prices"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "returns" | "return" | "r" => Ok(Self::Returns),
            "prices" | "price" | "p" => Ok(Self::Prices),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

// ── Controller phase ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Calculating,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Calculating => write!(f, "calculating"),
        }
    }
}

/// Monotonic id attached to every asynchronous operation. Only the completion
/// carrying the latest token of its kind is applied.
pub type RequestToken = u64;

// ── Messages INTO the controller ──

#[derive(Debug, Clone)]
pub enum ViewEvent {
    EditText(String),
    ToggleMode(Mode),
    EditLambda(String),
    UploadCsv(PathBuf),
    Calculate,
    CsvLoaded {
        token: RequestToken,
        result: AppResult<Vec<f64>>,
    },
    EstimateReady {
        token: RequestToken,
        result: AppResult<Estimate>,
    },
    /// Front end is closing; the loop exits once in-flight work completes
    Shutdown,
}

// ── Asynchronous work requested BY the controller ──

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadCsv { token: RequestToken, path: PathBuf },
    RequestEstimate { token: RequestToken, request: VolatilityRequest },
}

pub type Effects = SmallVec<[Effect; 2]>;

// ── View state (owned by the controller task, no locks) ──

#[derive(Debug, Clone)]
pub struct ViewState {
    pub mode: Mode,
    /// Raw text of the series input field
    pub text_input: String,
    /// Raw text of the lambda field
    pub lambda_input: String,
    /// Series currently charted. Replaced only by a calculation or a CSV import.
    pub series: Vec<f64>,
    pub estimate: Estimate,
    pub error: Option<AppError>,
    pub phase: Phase,
    pub(crate) next_token: RequestToken,
    pub(crate) latest_csv: Option<RequestToken>,
    pub(crate) latest_calc: Option<RequestToken>,
}

impl ViewState {
    pub fn new(default_lambda: &str) -> Self {
        Self {
            mode: Mode::default(),
            text_input: INITIAL_TEXT.to_string(),
            lambda_input: default_lambda.to_string(),
            series: parse_series(INITIAL_TEXT),
            estimate: Estimate::unavailable(),
            error: None,
            phase: Phase::Idle,
            next_token: 0,
            latest_csv: None,
            latest_calc: None,
        }
    }

    #[inline]
    pub(crate) fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        self.next_token
    }
}
