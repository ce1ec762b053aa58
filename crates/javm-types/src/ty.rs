//! Core type definitions: primitive kinds, type keys and descriptors

use std::fmt;

/// Primitive types of the managed language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveKind {
    /// Every primitive kind, in descriptor-table order
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Full keyword, used when the primitive is named on its own (`byte.class`)
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Single-letter code, used as an array element
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Look up a primitive by keyword
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Look up a primitive by its single-letter code
    pub fn from_descriptor(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.descriptor() == code)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a class inside the registry that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    /// Numeric index of the class
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Innermost (non-array) part of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// A primitive kind
    Primitive(PrimitiveKind),
    /// A class or interface
    Class(ClassId),
}

/// Key identifying one type
///
/// Arrays are keyed structurally by element and dimension count, so two
/// array keys are equal exactly when they denote the same array type. No
/// registration is needed to form an array of any depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    base: BaseType,
    dimensions: u32,
}

impl TypeKey {
    /// Key of a primitive type
    pub const fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            base: BaseType::Primitive(kind),
            dimensions: 0,
        }
    }

    /// Key of a class or interface
    pub const fn class(id: ClassId) -> Self {
        Self {
            base: BaseType::Class(id),
            dimensions: 0,
        }
    }

    /// Array of `element` with `dimensions` additional dimensions
    ///
    /// `element` may itself be an array; dimensions accumulate.
    ///
    /// # Panics
    ///
    /// Panics if the total dimension count exceeds `u32::MAX`. Use
    /// [`TypeKey::checked_array_of`] for untrusted counts.
    pub fn array_of(element: TypeKey, dimensions: u32) -> Self {
        match Self::checked_array_of(element, dimensions) {
            Some(key) => key,
            None => panic!(
                "array dimension overflow: {} + {}",
                element.dimensions, dimensions
            ),
        }
    }

    /// Array of `element` with `dimensions` additional dimensions, or
    /// `None` if the total dimension count does not fit in a `u32`
    pub fn checked_array_of(element: TypeKey, dimensions: u32) -> Option<Self> {
        Some(Self {
            base: element.base,
            dimensions: element.dimensions.checked_add(dimensions)?,
        })
    }

    /// Innermost non-array type
    pub fn base(self) -> BaseType {
        self.base
    }

    /// Innermost non-array type as a key
    pub fn element(self) -> TypeKey {
        Self {
            base: self.base,
            dimensions: 0,
        }
    }

    /// Number of array dimensions (0 for non-arrays)
    pub fn dimensions(self) -> u32 {
        self.dimensions
    }

    /// Whether this is an array type
    pub fn is_array(self) -> bool {
        self.dimensions > 0
    }

    /// Whether this is a non-array primitive type
    pub fn is_primitive(self) -> bool {
        !self.is_array() && matches!(self.base, BaseType::Primitive(_))
    }

    /// Whether values of this type are references (classes and arrays)
    pub fn is_reference(self) -> bool {
        !self.is_primitive()
    }

    /// Type of one element of this array, one dimension down
    pub fn component(self) -> Option<TypeKey> {
        if self.dimensions == 0 {
            return None;
        }
        Some(Self {
            base: self.base,
            dimensions: self.dimensions - 1,
        })
    }

    pub(crate) fn class_id(self) -> Option<ClassId> {
        match self.base {
            BaseType::Class(id) if self.dimensions == 0 => Some(id),
            _ => None,
        }
    }
}

impl From<PrimitiveKind> for TypeKey {
    fn from(kind: PrimitiveKind) -> Self {
        TypeKey::primitive(kind)
    }
}

/// Resolved metadata for one class or interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// Registry index
    pub id: ClassId,
    /// Fully qualified dotted name
    pub name: String,
    /// Direct superclass (`None` only for the root)
    pub super_class: Option<ClassId>,
    /// Directly implemented (or extended, for interfaces) interfaces
    pub interfaces: Vec<ClassId>,
    /// Whether this is an interface
    pub is_interface: bool,
}

/// A resolved type, as a tagged variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDescriptor<'a> {
    /// Primitive type
    Primitive(PrimitiveKind),
    /// Class or interface type
    Class(&'a ClassDescriptor),
    /// Array type
    Array {
        /// Innermost element type
        element: TypeKey,
        /// Dimension count (at least 1)
        dimensions: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_tables() {
        assert_eq!(PrimitiveKind::Byte.name(), "byte");
        assert_eq!(PrimitiveKind::Long.descriptor(), 'J');
        assert_eq!(PrimitiveKind::Boolean.descriptor(), 'Z');
        assert_eq!(PrimitiveKind::from_name("double"), Some(PrimitiveKind::Double));
        assert_eq!(PrimitiveKind::from_descriptor('C'), Some(PrimitiveKind::Char));
        assert_eq!(PrimitiveKind::from_descriptor('L'), None);
        assert_eq!(PrimitiveKind::from_name("void"), None);
    }

    #[test]
    fn test_array_keys_are_structural() {
        let int = TypeKey::primitive(PrimitiveKind::Int);
        let a = TypeKey::array_of(int, 2);
        let b = TypeKey::array_of(TypeKey::array_of(int, 1), 1);
        assert_eq!(a, b);
        assert_ne!(a, TypeKey::array_of(int, 3));
        assert_ne!(a, TypeKey::array_of(TypeKey::primitive(PrimitiveKind::Long), 2));
    }

    #[test]
    fn test_component_and_element() {
        let s = TypeKey::class(ClassId(3));
        let arr = TypeKey::array_of(s, 3);
        assert_eq!(arr.component(), Some(TypeKey::array_of(s, 2)));
        assert_eq!(arr.element(), s);
        assert_eq!(s.component(), None);
        assert!(arr.is_reference());
        assert!(TypeKey::primitive(PrimitiveKind::Int).is_primitive());
        assert!(TypeKey::array_of(PrimitiveKind::Int.into(), 1).is_reference());
    }

    #[test]
    fn test_checked_array_of_rejects_overflow() {
        let int = TypeKey::primitive(PrimitiveKind::Int);
        let deepest = TypeKey::checked_array_of(int, u32::MAX).unwrap();
        assert_eq!(deepest.dimensions(), u32::MAX);
        assert_eq!(TypeKey::checked_array_of(deepest, 1), None);
        assert_eq!(TypeKey::checked_array_of(deepest, 0), Some(deepest));
        assert_eq!(
            TypeKey::checked_array_of(TypeKey::array_of(int, 1), u32::MAX),
            None
        );
    }

    #[test]
    #[should_panic(expected = "array dimension overflow")]
    fn test_array_of_overflow_panics() {
        let int = TypeKey::primitive(PrimitiveKind::Int);
        let _ = TypeKey::array_of(TypeKey::array_of(int, u32::MAX), 1);
    }
}
