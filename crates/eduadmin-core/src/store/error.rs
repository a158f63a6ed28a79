use std::fmt;

use thiserror::Error;

/// Shape a collection was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Unordered,
    Paginated,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Unordered => write!(f, "unordered"),
            Shape::Paginated => write!(f, "paginated"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid page number {0}: pages start at 1")]
    InvalidPage(u32),

    #[error("Collection {key} is {actual}, expected {expected}")]
    ShapeMismatch {
        key: String,
        expected: Shape,
        actual: Shape,
    },
}
