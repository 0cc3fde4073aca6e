use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid plot config `{scale}/{plot}`: {reason}")]
    InvalidConfig {
        scale: String,
        plot: String,
        reason: String,
    },

    #[error("invalid annotation #{index}: {reason}")]
    InvalidAnnotation { index: usize, reason: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
