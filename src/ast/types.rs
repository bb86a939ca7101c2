//! Types as AST nodes.
//!
//! Equality and hashing are structural and ignore source positions, so a
//! `Type` can key a map while the stored key still remembers where it was
//! written. Hashes are tag-prefixed per variant to keep distinct node kinds
//! with the same name apart.

use std::fmt::Display;
use std::hash::{Hash, Hasher};

use crate::lexer::Pos;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TypeKind {
    Unit,
    Int,
    Char,
    Bool,
    Float,
    /// A user-defined type name.
    User(String),
    /// A one-cell mutable reference.
    Ref(Box<Type>),
    /// A multi-dimensional array; `dims >= 1` by construction.
    Array(Box<Type>, usize),
    /// A function type `from -> to`.
    Function(Box<Type>, Box<Type>),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    pub pos: Pos,
}

impl Type {
    pub fn new(kind: TypeKind) -> Type {
        Type {
            kind,
            pos: Pos::default(),
        }
    }

    pub fn at(kind: TypeKind, pos: Pos) -> Type {
        Type { kind, pos }
    }

    pub fn unit() -> Type {
        Type::new(TypeKind::Unit)
    }

    pub fn int() -> Type {
        Type::new(TypeKind::Int)
    }

    pub fn char() -> Type {
        Type::new(TypeKind::Char)
    }

    pub fn bool() -> Type {
        Type::new(TypeKind::Bool)
    }

    pub fn float() -> Type {
        Type::new(TypeKind::Float)
    }

    pub fn user(name: impl Into<String>) -> Type {
        Type::new(TypeKind::User(name.into()))
    }

    pub fn reference(inner: Type) -> Type {
        Type::new(TypeKind::Ref(Box::new(inner)))
    }

    pub fn array(element: Type, dims: usize) -> Type {
        Type::new(TypeKind::Array(Box::new(element), dims))
    }

    pub fn function(from: Type, to: Type) -> Type {
        Type::new(TypeKind::Function(Box::new(from), Box::new(to)))
    }

    /// The internal string type is an alias for `array [*] of char`.
    pub fn string() -> Type {
        Type::array(Type::char(), 1)
    }

    /// All builtin types, as preloaded into the type table.
    pub fn builtins() -> Vec<Type> {
        vec![
            Type::unit(),
            Type::int(),
            Type::char(),
            Type::bool(),
            Type::float(),
        ]
    }

    pub fn is_builtin(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Unit | TypeKind::Int | TypeKind::Char | TypeKind::Bool | TypeKind::Float
        )
    }

    /// The name of a builtin or user type, if it has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Unit => Some("unit"),
            TypeKind::Int => Some("int"),
            TypeKind::Char => Some("char"),
            TypeKind::Bool => Some("bool"),
            TypeKind::Float => Some("float"),
            TypeKind::User(name) => Some(name),
            _ => None,
        }
    }

    /// Copy line info from another AST node.
    pub fn copy_pos(&mut self, other: &Type) {
        self.pos = other.pos;
    }
}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.kind {
            TypeKind::Unit => "unit".hash(state),
            TypeKind::Int => "int".hash(state),
            TypeKind::Char => "char".hash(state),
            TypeKind::Bool => "bool".hash(state),
            TypeKind::Float => "float".hash(state),
            TypeKind::User(name) => {
                "user".hash(state);
                name.hash(state);
            }
            TypeKind::Ref(inner) => {
                "ref".hash(state);
                inner.hash(state);
            }
            TypeKind::Array(element, dims) => {
                "array".hash(state);
                dims.hash(state);
                element.hash(state);
            }
            TypeKind::Function(from, to) => {
                "function".hash(state);
                from.hash(state);
                to.hash(state);
            }
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeKind::Unit => f.write_str("unit"),
            TypeKind::Int => f.write_str("int"),
            TypeKind::Char => f.write_str("char"),
            TypeKind::Bool => f.write_str("bool"),
            TypeKind::Float => f.write_str("float"),
            TypeKind::User(name) => f.write_str(name),
            TypeKind::Ref(inner) => write!(f, "({inner}) ref"),
            TypeKind::Array(element, 1) => write!(f, "array of ({element})"),
            TypeKind::Array(element, dims) => {
                write!(f, "array [{}] of ({element})", vec!["*"; *dims].join(", "))
            }
            TypeKind::Function(from, to) => write!(f, "({from}) -> ({to})"),
        }
    }
}
