//! Errors reported by grid operations.

use std::{error, fmt};

/// Result type for fallible grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// An error encountered while configuring, accessing or interpolating a grid.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// Mismatched dimension counts, invalid bounds or rebinding a populated grid.
    InvalidConfiguration(String),
    /// A flat index, multi-index, quantity or component outside the valid range.
    IndexOutOfBounds(String),
    /// A coordinate outside a non-periodic boundary.
    OutsideDomain(String),
    /// A call that breaks the usage contract of the grid, such as reading
    /// storage that has not been allocated for the current bounds.
    InvariantViolation(String),
}

impl GridError {
    pub(crate) fn configuration<S: Into<String>>(message: S) -> Self {
        GridError::InvalidConfiguration(message.into())
    }

    pub(crate) fn index<S: Into<String>>(message: S) -> Self {
        GridError::IndexOutOfBounds(message.into())
    }

    pub(crate) fn domain<S: Into<String>>(message: S) -> Self {
        GridError::OutsideDomain(message.into())
    }

    pub(crate) fn invariant<S: Into<String>>(message: S) -> Self {
        GridError::InvariantViolation(message.into())
    }

    /// Whether this error was caused by invalid configuration input.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, GridError::InvalidConfiguration(_))
    }

    /// Whether this error was caused by an index or coordinate outside the grid.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            GridError::IndexOutOfBounds(_) | GridError::OutsideDomain(_)
        )
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidConfiguration(message) => {
                write!(f, "Invalid grid configuration: {}", message)
            }
            GridError::IndexOutOfBounds(message) => write!(f, "Index out of bounds: {}", message),
            GridError::OutsideDomain(message) => write!(f, "Outside grid domain: {}", message),
            GridError::InvariantViolation(message) => {
                write!(f, "Grid used incorrectly: {}", message)
            }
        }
    }
}

impl error::Error for GridError {}
