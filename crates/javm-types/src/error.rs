//! Type registry errors

use thiserror::Error;

/// Errors produced while building or querying a [`TypeRegistry`](crate::TypeRegistry)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A type key or name that the registry does not know
    #[error("Unresolved type: {name}")]
    UnresolvedType {
        /// Name (or key description) that failed to resolve
        name: String,
    },

    /// A type name that is not a valid class, primitive or array name
    #[error("Invalid type name: '{name}'")]
    InvalidTypeName {
        /// Offending name
        name: String,
    },

    /// Cast rejected by the cast checker
    #[error("{from} cannot be cast to {to}")]
    ClassCast {
        /// Canonical name of the instance type
        from: String,
        /// Canonical name of the target type
        to: String,
    },

    /// The same class was declared twice
    #[error("Duplicate type: {name}")]
    DuplicateType {
        /// Class name
        name: String,
    },

    /// No class without a superclass was declared
    #[error("Type graph has no root class")]
    MissingRoot,

    /// More than one class without a superclass was declared
    #[error("Type graph has more than one root class: {first} and {second}")]
    MultipleRoots {
        /// First root found
        first: String,
        /// Second root found
        second: String,
    },

    /// A class reaches itself through its superclass chain
    #[error("Circular inheritance detected at {name}")]
    InheritanceCycle {
        /// A class on the cycle
        name: String,
    },

    /// A failure kind that is not a subtype of the throwable base class
    #[error("{name} is not a throwable type")]
    NotThrowable {
        /// Canonical name of the rejected type
        name: String,
    },
}

/// Result alias for registry operations
pub type TypeResult<T> = Result<T, TypeError>;
