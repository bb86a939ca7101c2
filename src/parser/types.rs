//! The type sub-language: `->` (right associative, loosest), `of`
//! (nonassoc), postfix `ref` (tightest, left chaining).

use crate::ast::{Type, TypeKind};
use crate::lexer::TokenKind;

use super::{ident_text, ParseError, ParseState, Parser};

/// Binding power of the type arrow.
const ARROW_BP: u8 = 1;
/// Operand binding power of `array ... of`; absorbs `ref` but not `->`.
const OF_RBP: u8 = 3;
/// Binding power of the postfix `ref`.
const REF_BP: u8 = 3;

impl Parser {
    pub(crate) fn type_expr(
        &mut self,
        st: &mut ParseState,
        min_bp: u8,
    ) -> Result<Type, ParseError> {
        let tok = match st.peek() {
            Some(tok) => tok.clone(),
            None => return Err(ParseError::eof("type")),
        };

        let mut lhs = match tok.kind {
            TokenKind::Unit => {
                st.next();
                Type::at(TypeKind::Unit, tok.pos())
            }
            TokenKind::Int => {
                st.next();
                Type::at(TypeKind::Int, tok.pos())
            }
            TokenKind::Char => {
                st.next();
                Type::at(TypeKind::Char, tok.pos())
            }
            TokenKind::Bool => {
                st.next();
                Type::at(TypeKind::Bool, tok.pos())
            }
            TokenKind::Float => {
                st.next();
                Type::at(TypeKind::Float, tok.pos())
            }
            TokenKind::Genid => {
                st.next();
                Type::at(TypeKind::User(ident_text(&tok)), tok.pos())
            }
            TokenKind::LParen => {
                st.next();
                let mut inner = self.type_expr(st, 0)?;
                st.expect(TokenKind::RParen, "parenthesized type")?;
                inner.pos = tok.pos();
                inner
            }
            TokenKind::Array => {
                st.next();
                let dims = if st.peek_kind() == Some(TokenKind::LBracket) {
                    st.next();
                    st.expect(TokenKind::Times, "array dimensions")?;
                    let mut dims = 1;
                    while st.peek_kind() == Some(TokenKind::Comma) {
                        st.next();
                        st.expect(TokenKind::Times, "array dimensions")?;
                        dims += 1;
                    }
                    st.expect(TokenKind::RBracket, "array dimensions")?;
                    dims
                } else {
                    1
                };
                st.expect(TokenKind::Of, "array type")?;
                let element = self.type_expr(st, OF_RBP)?;
                Type::at(TypeKind::Array(Box::new(element), dims), tok.pos())
            }
            _ => return Err(ParseError::on_token(&tok)),
        };

        loop {
            match st.peek_kind() {
                Some(TokenKind::Ref) if REF_BP >= min_bp => {
                    st.next();
                    let pos = lhs.pos;
                    lhs = Type::at(TypeKind::Ref(Box::new(lhs)), pos);
                }
                Some(TokenKind::Arrow) if ARROW_BP >= min_bp => {
                    let arrow_pos = st.peek().expect("peeked").pos();
                    st.next();
                    let rhs = self.type_expr(st, ARROW_BP)?;
                    // The function node is positioned at its arrow.
                    lhs = Type::at(TypeKind::Function(Box::new(lhs), Box::new(rhs)), arrow_pos);
                }
                _ => break,
            }
        }

        Ok(lhs)
    }
}
