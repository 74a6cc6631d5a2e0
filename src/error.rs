use thiserror::Error;

#[derive(Error, Debug)]
pub enum GaitError {
    #[error("Joint not found: {0}")]
    MissingJoint(String),
    #[error("No thigh-to-foot segment available to resolve leg length")]
    NoLegSegment,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to write gait records: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode gait records: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GaitError>;
