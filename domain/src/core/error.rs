//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("A vote block must contain at least one line")]
    EmptyBlock,

    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(String),

    #[error("Invalid partition mode: {0}")]
    InvalidPartitionMode(String),
}

impl DomainError {
    /// Check if this error is the empty-block error
    pub fn is_empty_block(&self) -> bool {
        matches!(self, DomainError::EmptyBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_block_display() {
        let error = DomainError::EmptyBlock;
        assert_eq!(
            error.to_string(),
            "A vote block must contain at least one line"
        );
    }

    #[test]
    fn test_is_empty_block_check() {
        assert!(DomainError::EmptyBlock.is_empty_block());
        assert!(!DomainError::InvalidFilter("(".to_string()).is_empty_block());
        assert!(!DomainError::InvalidPartitionMode("by-word".to_string()).is_empty_block());
    }
}
