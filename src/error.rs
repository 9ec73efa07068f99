use serde::Serializer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogError {
    /// The content store answered with an error
    #[error("store error {code}: {message}")]
    Store { code: String, message: String },
    #[error("post not found: {0}")]
    NotFound(String),
    /// The fallback snapshot could not be read or parsed
    #[error("fallback snapshot error: {0}")]
    Parse(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BlogError {
    pub fn store(code: impl Into<String>, message: impl Into<String>) -> Self {
        BlogError::Store {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound(_))
    }
}

impl From<url::ParseError> for BlogError {
    fn from(value: url::ParseError) -> Self {
        BlogError::Config(format!("invalid store url: {}", value))
    }
}

/// Serializes an optional error as its message
pub fn serialize_error<S: Serializer>(error: &Option<BlogError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
