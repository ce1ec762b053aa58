//! Canonical type names
//!
//! The canonical name is the string a reflective `getName()` query returns:
//!
//! | Type                   | Name                    |
//! |------------------------|-------------------------|
//! | `byte`                 | `byte`                  |
//! | `java.lang.String`     | `java.lang.String`      |
//! | `long[]`               | `[J`                    |
//! | `Object[]`             | `[Ljava.lang.Object;`   |
//! | `int[][]`              | `[[I`                   |
//!
//! A primitive uses its keyword on its own and its letter code inside an
//! array name.

use crate::error::{TypeError, TypeResult};
use crate::registry::TypeRegistry;
use crate::ty::{BaseType, PrimitiveKind, TypeKey};

/// Array dimension prefix
pub const ARRAY_PREFIX: char = '[';

/// Convert a slash-separated internal name (`java/lang/String`) to dotted form
pub fn dotted_name(name: &str) -> String {
    name.replace('/', ".")
}

/// Convert a dotted name to the slash-separated internal form
pub fn slashed_name(name: &str) -> String {
    name.replace('.', "/")
}

/// Compare two class names regardless of separator style
pub fn same_class_name(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| x == y || (matches!(x, '.' | '/') && matches!(y, '.' | '/')))
}

impl TypeRegistry {
    /// Canonical external name of a type
    pub fn canonical_name(&self, key: TypeKey) -> TypeResult<String> {
        let element = match key.base() {
            BaseType::Primitive(kind) if key.is_array() => kind.descriptor().to_string(),
            BaseType::Primitive(kind) => return Ok(kind.name().to_string()),
            BaseType::Class(id) => {
                let class = self.class(id).ok_or_else(|| TypeError::UnresolvedType {
                    name: id.to_string(),
                })?;
                if !key.is_array() {
                    return Ok(class.name.clone());
                }
                format!("L{};", class.name)
            }
        };

        let dims = key.dimensions() as usize;
        let mut name = String::with_capacity(dims + element.len());
        name.extend(std::iter::repeat(ARRAY_PREFIX).take(dims));
        name.push_str(&element);
        Ok(name)
    }

    /// Resolve a canonical name back into a type key
    ///
    /// Accepts primitive keywords, class names and array names. Class parts
    /// may use dots or slashes.
    pub fn resolve(&self, name: &str) -> TypeResult<TypeKey> {
        let invalid = || TypeError::InvalidTypeName {
            name: name.to_string(),
        };

        let element = name.trim_start_matches(ARRAY_PREFIX);
        let dimensions = u32::try_from(name.len() - element.len()).map_err(|_| invalid())?;
        if element.is_empty() {
            return Err(invalid());
        }

        if dimensions == 0 {
            if let Some(kind) = PrimitiveKind::from_name(element) {
                return Ok(TypeKey::primitive(kind));
            }
            if !is_valid_class_name(element) {
                return Err(invalid());
            }
            return self.lookup(element);
        }

        let mut chars = element.chars();
        let base = match (chars.next(), chars.as_str()) {
            (Some('L'), rest) => {
                let class_name = rest.strip_suffix(';').ok_or_else(invalid)?;
                if !is_valid_class_name(class_name) {
                    return Err(invalid());
                }
                self.lookup(class_name)?
            }
            (Some(code), "") => TypeKey::primitive(PrimitiveKind::from_descriptor(code).ok_or_else(invalid)?),
            _ => return Err(invalid()),
        };
        Ok(TypeKey::array_of(base, dimensions))
    }
}

fn is_valid_class_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split(['.', '/'])
            .all(|segment| !segment.is_empty() && !segment.contains([';', '[']))
}
