//! Error types for the observable collections.
//!
//! Every fallible mutation returns [`CollectionError`] and fails before any
//! state change or notification takes place. Removal by key is not an error
//! path: it reports absence with `false`.

use thiserror::Error;

/// Errors raised by contract violations on the collection API.
///
/// # Examples
///
/// ```rust
/// use observable_collections::error::CollectionError;
///
/// let error = CollectionError::IndexOutOfRange { index: 4, length: 2 };
/// assert_eq!(error.to_string(), "index 4 is out of range for length 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CollectionError {
    /// An element with the same key already exists.
    #[error("an element with the same key already exists")]
    DuplicateKey,

    /// The key was not present on a read that requires it.
    #[error("the given key was not present in the collection")]
    KeyNotFound,

    /// A position-based access fell outside `[0, length)`.
    #[error("index {index} is out of range for length {length}")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The number of elements at the time of the call.
        length: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CollectionError::DuplicateKey, "an element with the same key already exists")]
    #[case(CollectionError::KeyNotFound, "the given key was not present in the collection")]
    #[case(
        CollectionError::IndexOutOfRange { index: 3, length: 0 },
        "index 3 is out of range for length 0"
    )]
    fn test_display(#[case] error: CollectionError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn test_error_trait() {
        let error = CollectionError::DuplicateKey;
        let _: &dyn std::error::Error = &error;
    }
}
