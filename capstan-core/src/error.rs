//! Error types for the Capstan object model

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur when constructing or projecting model objects
#[derive(Debug, Error)]
pub enum ModelError {
    /// Two data items in the same item-set share a name
    #[error("duplicate data item name: {0}")]
    DuplicateItemName(String),
}
