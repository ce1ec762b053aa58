//! Type registry holding the resolved class graph
//!
//! The registry is built once from class declarations, validated, and then
//! shared read-only (usually behind an `Arc`). Every class carries the
//! precomputed reflexive-transitive set of its supertypes and interfaces, so
//! cast checks never walk the hierarchy at query time.

use crate::error::{TypeError, TypeResult};
use crate::name::dotted_name;
use crate::ty::{ClassDescriptor, ClassId, TypeDescriptor, TypeKey};
use rustc_hash::{FxHashMap, FxHashSet};

/// Interface every array type implements
pub const CLONEABLE: &str = "java.lang.Cloneable";

/// Interface every array type implements
pub const SERIALIZABLE: &str = "java.io.Serializable";

/// Base class of every failure a thread can raise
pub const THROWABLE: &str = "java.lang.Throwable";

/// Registry of resolved class and interface descriptors
#[derive(Debug)]
pub struct TypeRegistry {
    /// Classes indexed by ID
    classes: Vec<ClassDescriptor>,
    /// Class name to ID mapping
    name_to_id: FxHashMap<String, ClassId>,
    /// Reflexive-transitive supertype closure, indexed by ID
    supertypes: Vec<FxHashSet<ClassId>>,
    /// The universal root class
    root: ClassId,
    /// `java.lang.Cloneable`, if registered
    cloneable: Option<ClassId>,
    /// `java.io.Serializable`, if registered
    serializable: Option<ClassId>,
}

impl TypeRegistry {
    /// Create a registry builder
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// The universal root type
    pub fn root(&self) -> TypeKey {
        TypeKey::class(self.root)
    }

    /// Look up a class or interface by dotted or slash-separated name
    pub fn lookup(&self, name: &str) -> TypeResult<TypeKey> {
        self.class_id(name)
            .map(TypeKey::class)
            .ok_or_else(|| TypeError::UnresolvedType {
                name: dotted_name(name),
            })
    }

    /// Get a class ID by name
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        match self.name_to_id.get(name) {
            Some(id) => Some(*id),
            None if name.contains('/') => self.name_to_id.get(&dotted_name(name)).copied(),
            None => None,
        }
    }

    /// Get class by ID
    pub fn class(&self, id: ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(id.index())
    }

    /// Get class by name
    pub fn class_by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.class_id(name).and_then(|id| self.class(id))
    }

    /// Resolve a key into its descriptor
    pub fn describe(&self, key: TypeKey) -> TypeResult<TypeDescriptor<'_>> {
        if key.is_array() {
            self.check_key(key.element())?;
            return Ok(TypeDescriptor::Array {
                element: key.element(),
                dimensions: key.dimensions(),
            });
        }
        match key.base() {
            crate::ty::BaseType::Primitive(kind) => Ok(TypeDescriptor::Primitive(kind)),
            crate::ty::BaseType::Class(id) => self
                .class(id)
                .map(TypeDescriptor::Class)
                .ok_or_else(|| unresolved_id(id)),
        }
    }

    /// Reflexive-transitive set of supertypes and interfaces of a class
    pub fn supertypes(&self, id: ClassId) -> Option<&FxHashSet<ClassId>> {
        self.supertypes.get(id.index())
    }

    /// Check whether `sub` is `sup` or inherits from it
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        self.supertypes(sub)
            .map(|set| set.contains(&sup))
            .unwrap_or(false)
    }

    /// Superclass chain from `id` up to the root, starting with `id` itself
    pub fn hierarchy(&self, id: ClassId) -> Vec<&ClassDescriptor> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            match self.class(id) {
                Some(class) => {
                    chain.push(class);
                    current = class.super_class;
                }
                None => break,
            }
        }
        chain
    }

    /// Iterate over all classes
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter()
    }

    /// Get the number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub(crate) fn root_id(&self) -> ClassId {
        self.root
    }

    pub(crate) fn array_interfaces(&self) -> [Option<ClassId>; 2] {
        [self.cloneable, self.serializable]
    }

    /// Verify that a key's class part belongs to this registry
    pub(crate) fn check_key(&self, key: TypeKey) -> TypeResult<()> {
        match key.base() {
            crate::ty::BaseType::Class(id) if self.class(id).is_none() => Err(unresolved_id(id)),
            _ => Ok(()),
        }
    }
}

fn unresolved_id(id: ClassId) -> TypeError {
    TypeError::UnresolvedType {
        name: id.to_string(),
    }
}

/// Where a declaration's superclass comes from
#[derive(Debug, Clone)]
enum SuperRef {
    /// Root candidate
    None,
    /// Interfaces hang off the root, whatever its name
    Root,
    Named(String),
}

#[derive(Debug, Clone)]
struct ClassDecl {
    name: String,
    super_class: SuperRef,
    interfaces: Vec<String>,
    is_interface: bool,
}

/// Builder for [`TypeRegistry`]
///
/// Classes may be declared in any order; references are resolved and the
/// graph validated by [`build`](TypeRegistryBuilder::build).
#[derive(Debug, Clone, Default)]
pub struct TypeRegistryBuilder {
    decls: Vec<ClassDecl>,
}

impl TypeRegistryBuilder {
    /// Declare a class
    ///
    /// A class declared without a superclass becomes the universal root;
    /// exactly one such class must exist.
    pub fn class(mut self, name: &str, super_class: Option<&str>, interfaces: &[&str]) -> Self {
        self.decls.push(ClassDecl {
            name: dotted_name(name),
            super_class: match super_class {
                Some(parent) => SuperRef::Named(dotted_name(parent)),
                None => SuperRef::None,
            },
            interfaces: interfaces.iter().map(|i| dotted_name(i)).collect(),
            is_interface: false,
        });
        self
    }

    /// Declare an interface, optionally extending other interfaces
    pub fn interface(mut self, name: &str, extends: &[&str]) -> Self {
        self.decls.push(ClassDecl {
            name: dotted_name(name),
            super_class: SuperRef::Root,
            interfaces: extends.iter().map(|i| dotted_name(i)).collect(),
            is_interface: true,
        });
        self
    }

    /// Number of declarations so far
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether nothing has been declared
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Validate the declarations and build the registry
    pub fn build(self) -> TypeResult<TypeRegistry> {
        let mut name_to_id = FxHashMap::default();
        for (index, decl) in self.decls.iter().enumerate() {
            if name_to_id
                .insert(decl.name.clone(), ClassId(index as u32))
                .is_some()
            {
                return Err(TypeError::DuplicateType {
                    name: decl.name.clone(),
                });
            }
        }

        let mut root: Option<ClassId> = None;
        for (index, decl) in self.decls.iter().enumerate() {
            if matches!(decl.super_class, SuperRef::None) {
                if let Some(existing) = root {
                    return Err(TypeError::MultipleRoots {
                        first: self.decls[existing.index()].name.clone(),
                        second: decl.name.clone(),
                    });
                }
                root = Some(ClassId(index as u32));
            }
        }
        let root = root.ok_or(TypeError::MissingRoot)?;

        let resolve = |name: &str| -> TypeResult<ClassId> {
            name_to_id
                .get(name)
                .copied()
                .ok_or_else(|| TypeError::UnresolvedType {
                    name: name.to_string(),
                })
        };

        let mut classes = Vec::with_capacity(self.decls.len());
        for (index, decl) in self.decls.iter().enumerate() {
            let super_class = match &decl.super_class {
                SuperRef::None => None,
                SuperRef::Root => Some(root),
                SuperRef::Named(parent) => Some(resolve(parent.as_str())?),
            };
            let interfaces = decl
                .interfaces
                .iter()
                .map(|name| resolve(name.as_str()))
                .collect::<TypeResult<Vec<_>>>()?;
            classes.push(ClassDescriptor {
                id: ClassId(index as u32),
                name: decl.name.clone(),
                super_class,
                interfaces,
                is_interface: decl.is_interface,
            });
        }

        let supertypes = compute_supertypes(&classes)?;
        let cloneable = name_to_id.get(CLONEABLE).copied();
        let serializable = name_to_id.get(SERIALIZABLE).copied();

        tracing::debug!(
            classes = classes.len(),
            root = %classes[root.index()].name,
            "type registry built"
        );

        Ok(TypeRegistry {
            classes,
            name_to_id,
            supertypes,
            root,
            cloneable,
            serializable,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

fn compute_supertypes(classes: &[ClassDescriptor]) -> TypeResult<Vec<FxHashSet<ClassId>>> {
    let mut state = vec![Visit::New; classes.len()];
    let mut closures: Vec<FxHashSet<ClassId>> = vec![FxHashSet::default(); classes.len()];
    for class in classes {
        visit(class.id, classes, &mut state, &mut closures)?;
    }
    Ok(closures)
}

fn visit(
    id: ClassId,
    classes: &[ClassDescriptor],
    state: &mut [Visit],
    closures: &mut [FxHashSet<ClassId>],
) -> TypeResult<()> {
    match state[id.index()] {
        Visit::Done => return Ok(()),
        Visit::Active => {
            return Err(TypeError::InheritanceCycle {
                name: classes[id.index()].name.clone(),
            })
        }
        Visit::New => {}
    }
    state[id.index()] = Visit::Active;

    let class = &classes[id.index()];
    let mut closure = FxHashSet::default();
    closure.insert(id);
    for parent in class.super_class.iter().chain(class.interfaces.iter()) {
        visit(*parent, classes, state, closures)?;
        closure.extend(closures[parent.index()].iter().copied());
    }

    closures[id.index()] = closure;
    state[id.index()] = Visit::Done;
    Ok(())
}
