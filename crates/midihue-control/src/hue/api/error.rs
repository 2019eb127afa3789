use thiserror::Error;

use crate::error::ControlError;

#[derive(Error, Debug)]
pub enum HueError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<HueError> for ControlError {
    fn from(err: HueError) -> Self {
        ControlError::Remote(err.to_string())
    }
}
