use crate::instance::{ErrorPtr, Key};
use std::any::TypeId;
use thiserror::Error;

/// Errors related to retrieving and resolving instances.
#[derive(Error, Clone, Debug)]
pub enum InjectorError {
    #[error("Unable to retrieve {0}")]
    NotFound(Key),
    #[error("Incorrect binding to {0}")]
    BindingMismatch(Key),
    #[error("Instance bound to {0} cannot be cast to the requested type")]
    IncompatibleInstance(Key),
    #[error("Type {type_id:?} does not declare method: {method}")]
    UnknownMethod { type_id: TypeId, method: String },
    #[error("Missing argument at position {position}")]
    MissingArgument { position: usize },
    #[error("Argument at position {position} is not compatible with: {expected}")]
    IncompatibleArgument {
        position: usize,
        expected: &'static str,
    },
    #[error("Error constructing instance: {0}")]
    Construction(ErrorPtr),
}

impl InjectorError {
    /// Checks if this error means the requested key could not be found at all, as opposed to
    /// being found but failing to resolve.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
