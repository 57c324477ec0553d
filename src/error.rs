use thiserror::Error;

/// Errors raised by quote operations.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote text must not be empty")]
    EmptyText,

    #[error("quote category must not be empty")]
    EmptyCategory,

    #[error("import document must be a JSON array of quotes")]
    Format,

    #[error("could not parse import document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("request to quote server failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("quote server returned status {0}")]
    Status(u16),

    #[error("sync worker failed: {0}")]
    Worker(String),
}

impl QuoteError {
    /// True for errors caused by user input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(self, QuoteError::EmptyText | QuoteError::EmptyCategory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            QuoteError::EmptyText.to_string(),
            "quote text must not be empty"
        );
        assert_eq!(
            QuoteError::EmptyCategory.to_string(),
            "quote category must not be empty"
        );
    }

    #[test]
    fn test_is_validation_check() {
        assert!(QuoteError::EmptyText.is_validation());
        assert!(QuoteError::EmptyCategory.is_validation());
        assert!(!QuoteError::Format.is_validation());
        assert!(!QuoteError::Status(500).is_validation());
        assert!(!QuoteError::Worker("cancelled".to_string()).is_validation());
    }
}
