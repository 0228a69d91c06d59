//! Error types for Typeahead core.

use std::fmt;

/// Errors raised by document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The element ID is invalid or the element has been removed.
    InvalidElement,
    /// Attempted to make an element its own ancestor.
    CircularParentage,
    /// The reference node passed to an insertion is not a child of the parent.
    NotAChild,
    /// A selector could not be parsed.
    InvalidSelector {
        /// The selector text as given.
        selector: String,
        /// What went wrong.
        message: String,
    },
}

impl DocumentError {
    /// Create an invalid selector error.
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElement => write!(f, "Invalid or removed element ID"),
            Self::CircularParentage => {
                write!(f, "An element cannot be inserted into its own subtree")
            }
            Self::NotAChild => write!(f, "Reference element is not a child of the parent"),
            Self::InvalidSelector { selector, message } => {
                write!(f, "Invalid selector '{selector}': {message}")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// A specialized Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
