use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("config error: {0}")]
    Config(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not found")]
    NotFound,
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Text for the transient notification shown after a failed action.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated => "User not logged in. Please login again.".into(),
            ClientError::Validation(err) => err.to_string(),
            ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Status { status, .. } => format!("Request failed ({status})"),
            ClientError::Transport(_) => "Could not reach the trip store.".into(),
            ClientError::NotFound => "Nothing found here.".into(),
            ClientError::Cancelled => "Request cancelled.".into(),
            ClientError::Config(_)
            | ClientError::Decode(_)
            | ClientError::Io(_)
            | ClientError::Other(_) => "Something went wrong.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("{0:?} is not a valid date (expected YYYY-MM-DD).")]
    InvalidDate(String),
    #[error("{0:?} is not a valid id.")]
    InvalidId(String),
    #[error("Start date cannot be in the past.")]
    StartInPast { start: NaiveDate, today: NaiveDate },
    #[error("End date cannot be before the start date.")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}
