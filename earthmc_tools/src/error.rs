use thiserror::Error;

#[derive(Debug, Error)]
pub enum EarthMcApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request could not be completed: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The response did not contain the requested data")]
    EmptyResponse,
}

impl EarthMcApiError {
    /// True for failures of the request itself, as opposed to a response that could not be understood.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::QueryError { .. } | Self::Initialization(_))
    }
}
