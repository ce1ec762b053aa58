//! Cast legality between runtime types
//!
//! Implements the relation checked by `checkcast` / `instanceof`: can an
//! instance whose runtime type is `instance` be used as a `target`?

use crate::error::{TypeError, TypeResult};
use crate::registry::TypeRegistry;
use crate::ty::{BaseType, TypeKey};

impl TypeRegistry {
    /// Check whether an instance of `instance` is assignable to `target`
    ///
    /// - Reflexivity: `T` is assignable to `T`.
    /// - Every reference type (class or array) is assignable to the root.
    /// - A class is assignable to its superclasses and to every interface
    ///   implemented by it or any of its superclasses.
    /// - Arrays are assignable to `java.lang.Cloneable` and
    ///   `java.io.Serializable` when those are registered.
    /// - Arrays of equal dimension count are assignable when their element
    ///   types are both references and assignable; primitive-element arrays
    ///   only match identical arrays.
    /// - A primitive is only assignable to itself.
    ///
    /// Never fails. Keys that do not belong to this registry are a caller
    /// defect and yield `false`.
    pub fn is_assignable(&self, instance: TypeKey, target: TypeKey) -> bool {
        if let Err(e) = self.check_key(instance).and_then(|_| self.check_key(target)) {
            tracing::error!(error = %e, "cast check with a key from another registry");
            return false;
        }

        if instance == target {
            return true;
        }
        if instance.is_primitive() || target.is_primitive() {
            return false;
        }

        match (instance.is_array(), target.is_array()) {
            (_, false) => {
                let target_id = match target.class_id() {
                    Some(id) => id,
                    None => return false,
                };
                if target_id == self.root_id() {
                    return true;
                }
                if instance.is_array() {
                    return self.array_interfaces().contains(&Some(target_id));
                }
                match instance.class_id() {
                    Some(instance_id) => self.is_subclass_of(instance_id, target_id),
                    None => false,
                }
            }
            (false, true) => false,
            (true, true) => {
                if instance.dimensions() != target.dimensions() {
                    return false;
                }
                match (instance.base(), target.base()) {
                    (BaseType::Class(from), BaseType::Class(to)) => self.is_subclass_of(from, to),
                    // Equal primitive arrays were handled by reflexivity
                    _ => false,
                }
            }
        }
    }

    /// Cast check with a `ClassCastException`-style error on failure
    pub fn check_cast(&self, instance: TypeKey, target: TypeKey) -> TypeResult<()> {
        if self.is_assignable(instance, target) {
            return Ok(());
        }
        Err(TypeError::ClassCast {
            from: self.canonical_name(instance)?,
            to: self.canonical_name(target)?,
        })
    }
}
