//! Typed errors for type well-formedness and type-definition processing.

use std::{error::Error, fmt::Display};

use crate::ast::{Constructor, Type};
use crate::lexer::Pos;

/// A type expression that breaks a well-formedness rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InvalidTypeError {
    ArrayOfArray(ArrayOfArray),
    ArrayReturn(ArrayReturn),
    RefOfArray(RefOfArray),
}

impl InvalidTypeError {
    /// The offending node, with its source position.
    pub fn node(&self) -> &Type {
        match self {
            InvalidTypeError::ArrayOfArray(e) => &e.node,
            InvalidTypeError::ArrayReturn(e) => &e.node,
            InvalidTypeError::RefOfArray(e) => &e.node,
        }
    }

    pub fn pos(&self) -> Pos {
        self.node().pos
    }
}

impl Display for InvalidTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidTypeError::ArrayOfArray(e) => e.fmt(f),
            InvalidTypeError::ArrayReturn(e) => e.fmt(f),
            InvalidTypeError::RefOfArray(e) => e.fmt(f),
        }
    }
}

impl Error for InvalidTypeError {}

/// An array whose element type is itself an array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArrayOfArray {
    pub node: Type,
}

impl Display for ArrayOfArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invalid type: Array of array")
    }
}

impl Error for ArrayOfArray {}

/// A function whose result type is an array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArrayReturn {
    pub node: Type,
}

impl Display for ArrayReturn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invalid type: Function returning array")
    }
}

impl Error for ArrayReturn {}

/// A reference whose target type is an array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RefOfArray {
    pub node: Type,
}

impl Display for RefOfArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invalid type: Reference of array")
    }
}

impl Error for RefOfArray {}

/// A conflict while registering a user type definition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BadTypeDefError {
    RedefBuiltinType(RedefBuiltinType),
    RedefUserType(RedefUserType),
    RedefConstructor(RedefConstructor),
    UndefType(UndefType),
}

impl BadTypeDefError {
    pub fn pos(&self) -> Pos {
        match self {
            BadTypeDefError::RedefBuiltinType(e) => e.node.pos,
            BadTypeDefError::RedefUserType(e) => e.node.pos,
            BadTypeDefError::RedefConstructor(e) => e.node.pos,
            BadTypeDefError::UndefType(e) => e.node.pos,
        }
    }
}

impl Display for BadTypeDefError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadTypeDefError::RedefBuiltinType(e) => e.fmt(f),
            BadTypeDefError::RedefUserType(e) => e.fmt(f),
            BadTypeDefError::RedefConstructor(e) => e.fmt(f),
            BadTypeDefError::UndefType(e) => e.fmt(f),
        }
    }
}

impl Error for BadTypeDefError {}

/// Redefinition of a builtin type, e.g. `type bool = ...`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RedefBuiltinType {
    pub node: Type,
}

impl Display for RedefBuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Redefinition of builtin type '{}'",
            self.node.name().unwrap_or_default()
        )
    }
}

impl Error for RedefBuiltinType {}

/// Redefinition of a user type; `prev` is the stored node of the first
/// definition, quoted with its position.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RedefUserType {
    pub node: Type,
    pub prev: Type,
}

impl Display for RedefUserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Redefinition of user type '{}'; previous definition at {}",
            self.node.name().unwrap_or_default(),
            self.prev.pos
        )
    }
}

impl Error for RedefUserType {}

/// Reuse of a constructor name; `prev` is the first defining occurrence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RedefConstructor {
    pub node: Constructor,
    pub prev: Constructor,
}

impl Display for RedefConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Redefinition of constructor '{}'; previous definition at {}",
            self.node.name, self.prev.pos
        )
    }
}

impl Error for RedefConstructor {}

/// A constructor argument type that is not registered in the type table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UndefType {
    pub node: Type,
}

impl Display for UndefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Undefined type '{}'", self.node)
    }
}

impl Error for UndefType {}
