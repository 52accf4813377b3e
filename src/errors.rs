/// Error kinds for the whole pipeline, client and service side.
/// Client-side errors are recoverable: the controller stores the latest one
/// and clears it on the next edit or successful operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("enter at least one number")]
    EmptySeries,

    #[error("lambda is not a number: {0:?}")]
    InvalidLambda(String),

    #[error("no numeric column found in CSV (checked the first row of every field)")]
    NoNumericColumn,

    #[error("csv error: {0}")]
    Csv(String),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Calc(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Csv(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
