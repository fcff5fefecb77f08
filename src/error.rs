use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// Root chart has no rows and zero data is not allowed.
    ///
    /// `ChartEngine::render` recovers from this by painting a fallback message.
    #[error("no data found")]
    NoData,

    #[error("argument `{name}` is required")]
    ArgumentRequired { name: String },

    #[error("argument `{name}` is invalid: {message}")]
    ArgumentInvalid { name: String, message: String },

    #[error("invalid operation: {0}")]
    OperationInvalid(String),

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ChartError {
    #[must_use]
    pub fn argument_required(name: impl Into<String>) -> Self {
        Self::ArgumentRequired { name: name.into() }
    }

    #[must_use]
    pub fn argument_invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArgumentInvalid {
            name: name.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}
