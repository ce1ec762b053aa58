//! javm type identity
//!
//! Leaf component of the runtime core:
//! - Type registry holding the resolved class graph
//! - Cast checker (`is_assignable` / `check_cast`)
//! - Canonical class names for primitives, classes and arrays

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod assignability;
pub mod bootstrap;
pub mod error;
pub mod name;
pub mod registry;
pub mod ty;

pub use bootstrap::{standard_builder, standard_registry};
pub use error::{TypeError, TypeResult};
pub use name::{dotted_name, same_class_name, slashed_name};
pub use registry::{TypeRegistry, TypeRegistryBuilder, CLONEABLE, SERIALIZABLE, THROWABLE};
pub use ty::{BaseType, ClassDescriptor, ClassId, PrimitiveKind, TypeDescriptor, TypeKey};
