//! Parser for the Llama language.
//!
//! Recursive descent over the lexed token stream, with a Pratt
//! operator-precedence core for expressions and for the type sub-language.
//! The parser owns the type table: user type definitions are registered as
//! they are reduced, and type annotations are validated at their points of
//! use. Validation failures are logged and parsing continues; syntax errors
//! resynchronise at the next top-level `let`/`type`.

mod expr;
mod state;
mod types;

pub use state::*;

use std::{error::Error, fmt::Display};

use crate::ast::{
    ArrayVariableDef, Constructor, Def, Definition, FunctionDef, LetDef, Param, Pattern, Program,
    TDef, Type, TypeDefGroup, VariableDef,
};
use crate::diagnostics::{shared, Logger, SharedLogger};
use crate::lexer::{Lexer, Pos, Token, TokenKind};
use crate::typechecker::{validate, TypeTable};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: Option<Pos>,
}

impl ParseError {
    pub fn on_token(token: &Token) -> ParseError {
        ParseError {
            message: format!("Syntax error on token {token}"),
            position: Some(token.pos()),
        }
    }

    pub fn eof(item: &str) -> ParseError {
        ParseError {
            message: format!("hit EOF while parsing {item}"),
            position: None,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{pos}: error: {}", self.message),
            None => write!(f, "error: {}", self.message),
        }
    }
}

impl Error for ParseError {}

/// A parser for the entire Llama grammar.
pub struct Parser {
    logger: SharedLogger,
    pub type_table: TypeTable,
    verbose: bool,
}

impl Parser {
    pub fn new(logger: SharedLogger) -> Parser {
        Parser {
            logger,
            type_table: TypeTable::new(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Parser {
        self.verbose = verbose;
        if verbose {
            self.logger.borrow_mut().info("parser ready");
        }
        self
    }

    pub fn logger(&self) -> SharedLogger {
        self.logger.clone()
    }

    fn state_for(&mut self, data: &str) -> ParseState {
        let mut lexer = Lexer::new(data, self.logger.clone());
        lexer.input(data);
        ParseState::new(lexer.collect())
    }

    /// Parse a whole program. The result may be partial when syntax errors
    /// occur; the shared logger is the authoritative success indicator.
    pub fn parse(&mut self, data: &str) -> Program {
        let mut st = self.state_for(data);
        self.program(&mut st)
    }

    /// Parse the token stream of a caller-configured lexer.
    pub fn parse_with_lexer(&mut self, lexer: &mut Lexer) -> Program {
        let mut st = ParseState::new(lexer.by_ref().collect());
        self.program(&mut st)
    }

    pub(crate) fn report(&mut self, err: &ParseError) {
        self.logger.borrow_mut().error(err.to_string());
    }

    pub(crate) fn validate_type(&mut self, ty: &Type) {
        if let Err(err) = validate(ty) {
            let msg = format!("{}: error: {err}", err.pos());
            self.logger.borrow_mut().error(msg);
        }
    }

    fn finish<T>(&mut self, st: &ParseState, parsed: Result<T, ParseError>) -> Option<T> {
        let parsed = parsed.and_then(|value| match st.peek() {
            Some(tok) => Err(ParseError::on_token(tok)),
            None => Ok(value),
        });
        match parsed {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Parse a single expression (start symbol `expr`).
    pub fn parse_expression(&mut self, data: &str) -> Option<crate::ast::Expression> {
        let mut st = self.state_for(data);
        let parsed = self.expr(&mut st, 0);
        self.finish(&st, parsed)
    }

    /// Parse a single type (start symbol `type`).
    pub fn parse_type(&mut self, data: &str) -> Option<Type> {
        let mut st = self.state_for(data);
        let parsed = self.type_expr(&mut st, 0);
        self.finish(&st, parsed)
    }

    /// Parse a `let` group (start symbol `letdef`).
    pub fn parse_letdef(&mut self, data: &str) -> Option<LetDef> {
        let mut st = self.state_for(data);
        let parsed = self.letdef(&mut st);
        self.finish(&st, parsed)
    }

    /// Parse a single definition (start symbol `def`).
    pub fn parse_def(&mut self, data: &str) -> Option<Def> {
        let mut st = self.state_for(data);
        let parsed = self.def(&mut st);
        self.finish(&st, parsed)
    }

    /// Parse a pattern (start symbol `pattern`).
    pub fn parse_pattern(&mut self, data: &str) -> Option<Pattern> {
        let mut st = self.state_for(data);
        let parsed = self.pattern(&mut st);
        self.finish(&st, parsed)
    }

    /// Parse a constructor declaration (start symbol `constr`).
    pub fn parse_constructor(&mut self, data: &str) -> Option<Constructor> {
        let mut st = self.state_for(data);
        let parsed = self.constr(&mut st);
        self.finish(&st, parsed)
    }

    fn program(&mut self, st: &mut ParseState) -> Program {
        let pos = st.peek().map(|tok| tok.pos()).unwrap_or_default();
        let mut defs = vec![];

        while let Some(tok) = st.peek().cloned() {
            let item = match tok.kind {
                TokenKind::Let => self.letdef(st).map(Definition::Let),
                TokenKind::Type => self.typedef(st).map(Definition::Type),
                _ => Err(ParseError::on_token(&tok)),
            };
            match item {
                Ok(def) => {
                    if self.verbose {
                        self.logger
                            .borrow_mut()
                            .debug(format!("reduced top-level definition at {}", tok.pos()));
                    }
                    defs.push(def);
                }
                Err(err) => {
                    self.report(&err);
                    self.resync(st);
                }
            }
        }

        Program { defs, pos }
    }

    /// Skip ahead to the next token that can start a top-level definition.
    fn resync(&mut self, st: &mut ParseState) {
        st.next();
        while let Some(kind) = st.peek_kind() {
            if matches!(kind, TokenKind::Let | TokenKind::Type) {
                break;
            }
            st.next();
        }
    }

    pub(crate) fn letdef(&mut self, st: &mut ParseState) -> Result<LetDef, ParseError> {
        let let_tok = st.expect(TokenKind::Let, "letdef")?;
        let rec = if st.peek_kind() == Some(TokenKind::Rec) {
            st.next();
            true
        } else {
            false
        };

        let mut defs = vec![self.def(st)?];
        while st.peek_kind() == Some(TokenKind::And) {
            st.next();
            defs.push(self.def(st)?);
        }

        Ok(LetDef {
            defs,
            rec,
            pos: let_tok.pos(),
        })
    }

    fn def(&mut self, st: &mut ParseState) -> Result<Def, ParseError> {
        match st.peek_kind() {
            Some(TokenKind::Mutable) => self.variable_def(st),
            Some(TokenKind::Genid) => self.function_def(st),
            Some(_) => Err(ParseError::on_token(st.peek().expect("peeked"))),
            None => Err(ParseError::eof("definition")),
        }
    }

    fn function_def(&mut self, st: &mut ParseState) -> Result<Def, ParseError> {
        let name_tok = st.expect(TokenKind::Genid, "function definition")?;
        let name = ident_text(&name_tok);

        let mut params = vec![];
        loop {
            match st.peek_kind() {
                Some(TokenKind::Genid) => {
                    let tok = st.next().expect("peeked");
                    params.push(Param {
                        name: ident_text(&tok),
                        ty: None,
                        pos: tok.pos(),
                    });
                }
                Some(TokenKind::LParen) => {
                    let lparen = st.next().expect("peeked");
                    let tok = st.expect(TokenKind::Genid, "parameter")?;
                    st.expect(TokenKind::Colon, "parameter")?;
                    let ty = self.type_expr(st, 0)?;
                    st.expect(TokenKind::RParen, "parameter")?;
                    self.validate_type(&ty);
                    params.push(Param {
                        name: ident_text(&tok),
                        ty: Some(ty),
                        pos: lparen.pos(),
                    });
                }
                _ => break,
            }
        }

        let return_type = if st.peek_kind() == Some(TokenKind::Colon) {
            st.next();
            Some(self.type_expr(st, 0)?)
        } else {
            None
        };

        st.expect(TokenKind::Eq, "function definition")?;
        let body = self.expr(st, 0)?;

        Ok(Def::Function(FunctionDef {
            name,
            params,
            body,
            return_type,
            pos: name_tok.pos(),
        }))
    }

    fn variable_def(&mut self, st: &mut ParseState) -> Result<Def, ParseError> {
        let mutable_tok = st.expect(TokenKind::Mutable, "variable definition")?;
        let name_tok = st.expect(TokenKind::Genid, "variable definition")?;
        let name = ident_text(&name_tok);

        if st.peek_kind() == Some(TokenKind::LBracket) {
            st.next();
            let mut dimensions = vec![self.expr(st, 0)?];
            while st.peek_kind() == Some(TokenKind::Comma) {
                st.next();
                dimensions.push(self.expr(st, 0)?);
            }
            st.expect(TokenKind::RBracket, "array variable definition")?;

            let ty = if st.peek_kind() == Some(TokenKind::Colon) {
                st.next();
                let element = self.type_expr(st, 0)?;
                let mut array = Type::array(element.clone(), dimensions.len());
                array.copy_pos(&element);
                self.validate_type(&array);
                Some(array)
            } else {
                None
            };

            return Ok(Def::Array(ArrayVariableDef {
                name,
                dimensions,
                ty,
                pos: mutable_tok.pos(),
            }));
        }

        let ty = if st.peek_kind() == Some(TokenKind::Colon) {
            st.next();
            let nominal = self.type_expr(st, 0)?;
            let mut reference = Type::reference(nominal.clone());
            reference.copy_pos(&nominal);
            self.validate_type(&reference);
            Some(reference)
        } else {
            None
        };

        Ok(Def::Variable(VariableDef {
            name,
            ty,
            pos: mutable_tok.pos(),
        }))
    }

    fn typedef(&mut self, st: &mut ParseState) -> Result<TypeDefGroup, ParseError> {
        let type_tok = st.expect(TokenKind::Type, "typedef")?;

        let mut defs = vec![self.tdef(st)?];
        while st.peek_kind() == Some(TokenKind::And) {
            st.next();
            defs.push(self.tdef(st)?);
        }

        let group = TypeDefGroup {
            defs,
            pos: type_tok.pos(),
        };
        for err in self.type_table.process(&group) {
            let msg = format!("{}: error: {err}", err.pos());
            self.logger.borrow_mut().error(msg);
        }
        Ok(group)
    }

    fn tdef(&mut self, st: &mut ParseState) -> Result<TDef, ParseError> {
        let tok = match st.next() {
            Some(tok) => tok,
            None => return Err(ParseError::eof("type definition")),
        };
        // Redefinition of a builtin parses fine and is flagged by the table.
        let ty = match tok.kind {
            TokenKind::Genid => Type::at(crate::ast::TypeKind::User(ident_text(&tok)), tok.pos()),
            TokenKind::Unit => Type::at(crate::ast::TypeKind::Unit, tok.pos()),
            TokenKind::Int => Type::at(crate::ast::TypeKind::Int, tok.pos()),
            TokenKind::Char => Type::at(crate::ast::TypeKind::Char, tok.pos()),
            TokenKind::Bool => Type::at(crate::ast::TypeKind::Bool, tok.pos()),
            TokenKind::Float => Type::at(crate::ast::TypeKind::Float, tok.pos()),
            _ => return Err(ParseError::on_token(&tok)),
        };

        st.expect(TokenKind::Eq, "type definition")?;

        let mut constructors = vec![self.constr(st)?];
        while st.peek_kind() == Some(TokenKind::Pipe) {
            st.next();
            constructors.push(self.constr(st)?);
        }

        Ok(TDef {
            ty,
            constructors,
            pos: tok.pos(),
        })
    }

    pub(crate) fn constr(&mut self, st: &mut ParseState) -> Result<Constructor, ParseError> {
        let tok = st.expect(TokenKind::Conid, "constructor")?;
        let name = ident_text(&tok);

        let mut arg_types = vec![];
        if st.peek_kind() == Some(TokenKind::Of) {
            st.next();
            loop {
                let ty = self.type_expr(st, 0)?;
                self.validate_type(&ty);
                arg_types.push(ty);
                if !self.type_starts(st) {
                    break;
                }
            }
        }

        Ok(Constructor {
            name,
            arg_types,
            pos: tok.pos(),
        })
    }

    fn type_starts(&self, st: &ParseState) -> bool {
        matches!(
            st.peek_kind(),
            Some(
                TokenKind::Unit
                    | TokenKind::Int
                    | TokenKind::Char
                    | TokenKind::Bool
                    | TokenKind::Float
                    | TokenKind::Genid
                    | TokenKind::Array
                    | TokenKind::LParen
            )
        )
    }
}

pub(crate) fn ident_text(token: &Token) -> String {
    match &token.value {
        crate::lexer::TokenValue::Ident(name) => name.clone(),
        _ => String::new(),
    }
}

/// Parse `data` with a fresh parser and the given logger.
pub fn parse(data: &str, logger: SharedLogger) -> Program {
    Parser::new(logger).parse(data)
}

/// Parse `data`, silencing all diagnostics.
pub fn quiet_parse(data: &str) -> Program {
    parse(data, shared(Logger::mock()))
}
