pub type SpuResult<T> = Result<T, SpuError>;

#[derive(thiserror::Error, Debug)]
pub enum SpuError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("format error: {0}")]
    Format(String),
}

impl SpuError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
