//! Programs, let-definitions and type definitions.

use crate::lexer::Pos;

use super::{expression::Expression, types::Type, Named};

/// An ordered sequence of top-level definition groups.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub defs: Vec<Definition>,
    pub pos: Pos,
}

/// A top-level item: a `let` group or a `type` group.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Definition {
    Let(LetDef),
    Type(TypeDefGroup),
}

/// `let [rec] def and def and ...`: one group of mutually recursive
/// bindings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LetDef {
    pub defs: Vec<Def>,
    pub rec: bool,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Def {
    Function(FunctionDef),
    Variable(VariableDef),
    Array(ArrayVariableDef),
}

impl Def {
    pub fn pos(&self) -> Pos {
        match self {
            Def::Function(d) => d.pos,
            Def::Variable(d) => d.pos,
            Def::Array(d) => d.pos,
        }
    }
}

/// A function (or plain value) definition. A `let x = e` binding is a
/// function with no parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Expression,
    pub return_type: Option<Type>,
    pub pos: Pos,
}

/// A formal parameter with an optional annotation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<Type>,
    pub pos: Pos,
}

/// `mutable x [: t]`. A declared type `t` is stored as `Ref(t)`: mutable
/// simple variables are always references to their nominal type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub ty: Option<Type>,
    pub pos: Pos,
}

/// `mutable x [d1, ..., dn] [: t]`. A declared element type `t` is stored as
/// the synthesized `Array(t, n)` whose dimension count equals the number of
/// dimension expressions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArrayVariableDef {
    pub name: String,
    pub dimensions: Vec<Expression>,
    pub ty: Option<Type>,
    pub pos: Pos,
}

/// `type t = C1 | C2 | ... and ...`: one group of mutually referential
/// user-type definitions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeDefGroup {
    pub defs: Vec<TDef>,
    pub pos: Pos,
}

/// One definition in a type group. The defined type is kept as a node so a
/// builtin redefinition can be flagged by the type table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TDef {
    pub ty: Type,
    pub constructors: Vec<Constructor>,
    pub pos: Pos,
}

/// A data constructor with the types of its arguments.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Constructor {
    pub name: String,
    pub arg_types: Vec<Type>,
    pub pos: Pos,
}

impl Constructor {
    pub fn new(name: impl Into<String>, arg_types: Vec<Type>) -> Self {
        Constructor {
            name: name.into(),
            arg_types,
            pos: Pos::default(),
        }
    }
}

impl Named for FunctionDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn pos(&self) -> Pos {
        self.pos
    }
}

impl Named for Param {
    fn name(&self) -> &str {
        &self.name
    }

    fn pos(&self) -> Pos {
        self.pos
    }
}

impl Named for VariableDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn pos(&self) -> Pos {
        self.pos
    }
}

impl Named for ArrayVariableDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn pos(&self) -> Pos {
        self.pos
    }
}

impl Named for Constructor {
    fn name(&self) -> &str {
        &self.name
    }

    fn pos(&self) -> Pos {
        self.pos
    }
}
