//! The type table: a catalogue of user-defined types and their constructors.
//!
//! Both maps preserve the originally inserted key object. Equality of type
//! nodes is structural and ignores positions, but two structurally equal
//! nodes can originate at different places; redefinition diagnostics must
//! quote the *first* defining position, so lookups can recover the stored
//! node (the `HashMap<K, (K, V)>` rendition of a key-preserving dictionary).

use std::collections::HashMap;

use crate::ast::{Constructor, Type, TypeDefGroup};

use super::error::{
    BadTypeDefError, RedefBuiltinType, RedefConstructor, RedefUserType, UndefType,
};

#[derive(Debug, Clone)]
struct TypeEntry {
    /// The defining node, position included.
    node: Type,
    constructors: Vec<Constructor>,
}

#[derive(Debug, Clone)]
struct ConstructorEntry {
    /// The defining node, position included.
    node: Constructor,
    of_type: Type,
}

/// Database of all the program's types. Builtins are always registered.
#[derive(Debug, Clone)]
pub struct TypeTable {
    known_types: HashMap<Type, TypeEntry>,
    known_constructors: HashMap<String, ConstructorEntry>,
}

impl TypeTable {
    pub fn new() -> TypeTable {
        let mut known_types = HashMap::new();
        for builtin in Type::builtins() {
            known_types.insert(
                builtin.clone(),
                TypeEntry {
                    node: builtin,
                    constructors: vec![],
                },
            );
        }
        TypeTable {
            known_types,
            known_constructors: HashMap::new(),
        }
    }

    /// Register a newly defined user type with an empty constructor list.
    /// Conflict detection precedes mutation: on error the table is unchanged.
    pub fn insert_new_type(&mut self, ty: &Type) -> Result<(), BadTypeDefError> {
        if ty.is_builtin() {
            return Err(BadTypeDefError::RedefBuiltinType(RedefBuiltinType {
                node: ty.clone(),
            }));
        }
        if let Some(entry) = self.known_types.get(ty) {
            return Err(BadTypeDefError::RedefUserType(RedefUserType {
                node: ty.clone(),
                prev: entry.node.clone(),
            }));
        }
        self.known_types.insert(
            ty.clone(),
            TypeEntry {
                node: ty.clone(),
                constructors: vec![],
            },
        );
        Ok(())
    }

    /// Register a constructor for the user type `ty`. All conflicts are
    /// detected before the table is touched.
    pub fn insert_constructor(
        &mut self,
        constructor: &Constructor,
        ty: &Type,
    ) -> Result<(), BadTypeDefError> {
        if let Some(prev) = self.known_constructors.get(&constructor.name) {
            return Err(BadTypeDefError::RedefConstructor(RedefConstructor {
                node: constructor.clone(),
                prev: prev.node.clone(),
            }));
        }
        for arg in &constructor.arg_types {
            if !self.known_types.contains_key(arg) {
                return Err(BadTypeDefError::UndefType(UndefType { node: arg.clone() }));
            }
        }
        if !self.known_types.contains_key(ty) {
            return Err(BadTypeDefError::UndefType(UndefType { node: ty.clone() }));
        }

        self.known_types
            .get_mut(ty)
            .expect("type checked above")
            .constructors
            .push(constructor.clone());
        self.known_constructors.insert(
            constructor.name.clone(),
            ConstructorEntry {
                node: constructor.clone(),
                of_type: ty.clone(),
            },
        );
        Ok(())
    }

    /// Process one `type ... and ...` group in two phases: first insert all
    /// newly defined types, then insert every constructor. The two-phase
    /// order lets mutually recursive definitions reference each other.
    /// Constructors of a definition whose type failed phase one are skipped.
    /// All conflicts of the group are returned so the caller can report each.
    pub fn process(&mut self, group: &TypeDefGroup) -> Vec<BadTypeDefError> {
        let mut errors = vec![];

        let mut inserted = Vec::with_capacity(group.defs.len());
        for tdef in &group.defs {
            match self.insert_new_type(&tdef.ty) {
                Ok(()) => inserted.push(true),
                Err(e) => {
                    errors.push(e);
                    inserted.push(false);
                }
            }
        }

        for (tdef, ok) in group.defs.iter().zip(inserted) {
            if !ok {
                continue;
            }
            for constructor in &tdef.constructors {
                if let Err(e) = self.insert_constructor(constructor, &tdef.ty) {
                    errors.push(e);
                }
            }
        }

        errors
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.known_types.contains_key(ty)
    }

    /// The stored key for `ty`, i.e. the node of its first definition.
    pub fn lookup_key(&self, ty: &Type) -> Option<&Type> {
        self.known_types.get(ty).map(|entry| &entry.node)
    }

    /// The constructors registered for `ty`, in definition order.
    pub fn constructors_of(&self, ty: &Type) -> Option<&[Constructor]> {
        self.known_types
            .get(ty)
            .map(|entry| entry.constructors.as_slice())
    }

    /// The user type a constructor belongs to, with the stored constructor
    /// node.
    pub fn constructor(&self, name: &str) -> Option<(&Constructor, &Type)> {
        self.known_constructors
            .get(name)
            .map(|entry| (&entry.node, &entry.of_type))
    }

    /// All registered types with their constructor lists.
    pub fn known_types(&self) -> impl Iterator<Item = (&Type, &[Constructor])> {
        self.known_types
            .values()
            .map(|entry| (&entry.node, entry.constructors.as_slice()))
    }

    /// All registered constructors with the user type they produce.
    pub fn known_constructors(&self) -> impl Iterator<Item = (&Constructor, &Type)> {
        self.known_constructors
            .values()
            .map(|entry| (&entry.node, &entry.of_type))
    }

    pub fn known_type_count(&self) -> usize {
        self.known_types.len()
    }

    pub fn known_constructor_count(&self) -> usize {
        self.known_constructors.len()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}
