//! The expression grammar: a Pratt core for binary/unary operators plus the
//! structured forms (`if`, `while`, `for`, `match`, `let ... in`, `dim`,
//! `new`, `delete`, `begin ... end`) and patterns.
//!
//! Precedence, loosest to tightest: `in`, `;`, `then`, `else`, `:=`, `||`,
//! `&&`, comparisons, additive, multiplicative, `**`, unary sign/`not`/
//! `delete`, then juxtaposition and `!`, then `new`, indexing and
//! parentheses.

use crate::ast::{
    ArrayExpression, BinaryExpression, Clause, ConidExpression, ConstExpression, ConstValue,
    ConstructorCallExpression, ConstructorPattern, DeleteExpression, DimExpression, Expression,
    ForExpression, FunctionCallExpression, GenidExpression, GenidPattern, IfExpression,
    LetInExpression, MatchExpression, NewExpression, Pattern, Type, UnaryExpression,
    WhileExpression,
};
use crate::lexer::{Token, TokenKind, TokenValue};

use super::{ident_text, ParseError, ParseState, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// Binding power of the unary operators (`not`, sign, `delete`).
const UNARY_BP: u8 = 15;
/// Right binding power of a `then` branch: absorbs `:=` and tighter.
const THEN_RBP: u8 = 7;
/// Right binding power of an `else` branch.
const ELSE_RBP: u8 = 8;

fn binary_bp(kind: TokenKind) -> Option<(u8, Assoc)> {
    match kind {
        TokenKind::Semicolon => Some((5, Assoc::Left)),
        TokenKind::Assign => Some((8, Assoc::NonAssoc)),
        TokenKind::BOr => Some((9, Assoc::Left)),
        TokenKind::BAnd => Some((10, Assoc::Left)),
        TokenKind::Lt
        | TokenKind::Le
        | TokenKind::Gt
        | TokenKind::Ge
        | TokenKind::Eq
        | TokenKind::Neq
        | TokenKind::NatEq
        | TokenKind::NatNeq => Some((11, Assoc::NonAssoc)),
        TokenKind::Plus | TokenKind::Minus | TokenKind::FPlus | TokenKind::FMinus => {
            Some((12, Assoc::Left))
        }
        TokenKind::Times
        | TokenKind::Divide
        | TokenKind::FTimes
        | TokenKind::FDivide
        | TokenKind::Mod => Some((13, Assoc::Left)),
        TokenKind::FPow => Some((14, Assoc::Right)),
        _ => None,
    }
}

/// Tokens that can start a simple expression, i.e. an application argument.
fn is_simple_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Genid
            | TokenKind::Conid
            | TokenKind::IntConst
            | TokenKind::FloatConst
            | TokenKind::CharConst
            | TokenKind::StringConst
            | TokenKind::True
            | TokenKind::False
            | TokenKind::LParen
            | TokenKind::Bang
    )
}

fn is_simple_pattern_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::True
            | TokenKind::False
            | TokenKind::IntConst
            | TokenKind::FloatConst
            | TokenKind::CharConst
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::FPlus
            | TokenKind::FMinus
            | TokenKind::Genid
            | TokenKind::LParen
    )
}

impl Parser {
    pub(crate) fn expr(
        &mut self,
        st: &mut ParseState,
        min_bp: u8,
    ) -> Result<Expression, ParseError> {
        let mut lhs = self.prefix_expr(st)?;

        while let Some(tok) = st.peek().cloned() {
            let Some((lbp, assoc)) = binary_bp(tok.kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            st.next();

            let rbp = match assoc {
                Assoc::Right => lbp,
                Assoc::Left | Assoc::NonAssoc => lbp + 1,
            };
            let rhs = self.expr(st, rbp)?;

            let pos = lhs.pos();
            lhs = Expression::Binary(Box::new(BinaryExpression {
                left: lhs,
                operator: tok.kind.op_text().to_string(),
                right: rhs,
                pos,
            }));

            // Chaining a non-associative operator at the same level is a
            // syntax error on the second operator.
            if assoc == Assoc::NonAssoc {
                if let Some(next) = st.peek() {
                    if let Some((next_bp, _)) = binary_bp(next.kind) {
                        if next_bp == lbp {
                            return Err(ParseError::on_token(next));
                        }
                    }
                }
            }
        }

        Ok(lhs)
    }

    fn prefix_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let tok = match st.peek() {
            Some(tok) => tok.clone(),
            None => return Err(ParseError::eof("expression")),
        };

        match tok.kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::FPlus
            | TokenKind::FMinus
            | TokenKind::Not => {
                st.next();
                let operand = self.expr(st, UNARY_BP + 1)?;
                Ok(Expression::Unary(Box::new(UnaryExpression {
                    operator: tok.kind.op_text().to_string(),
                    operand,
                    pos: tok.pos(),
                })))
            }
            TokenKind::Delete => {
                st.next();
                let expr = self.expr(st, UNARY_BP + 1)?;
                Ok(Expression::Delete(Box::new(DeleteExpression {
                    expr,
                    pos: tok.pos(),
                })))
            }
            TokenKind::Bang => self.bang_expr(st),
            TokenKind::New => self.new_expr(st),
            TokenKind::If => self.if_expr(st),
            TokenKind::While => self.while_expr(st),
            TokenKind::For => self.for_expr(st),
            TokenKind::Match => self.match_expr(st),
            TokenKind::Dim => self.dim_expr(st),
            TokenKind::Begin => self.begin_expr(st),
            TokenKind::Let => self.let_in_expr(st),
            TokenKind::Genid => self.genid_expr(st),
            TokenKind::Conid => self.conid_expr(st),
            TokenKind::LParen => self.paren_expr(st),
            TokenKind::IntConst
            | TokenKind::FloatConst
            | TokenKind::CharConst
            | TokenKind::StringConst
            | TokenKind::True
            | TokenKind::False => {
                st.next();
                Ok(const_expr(&tok))
            }
            _ => Err(ParseError::on_token(&tok)),
        }
    }

    /// `!` binds tighter than application but looser than `new`, indexing
    /// and parentheses.
    fn bang_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let bang = st.expect(TokenKind::Bang, "dereference")?;
        let operand = match st.peek_kind() {
            Some(TokenKind::Bang) => self.bang_expr(st)?,
            Some(TokenKind::New) => self.new_expr(st)?,
            _ => self.simple_atom(st)?,
        };
        Ok(Expression::Unary(Box::new(UnaryExpression {
            operator: "!".to_string(),
            operand,
            pos: bang.pos(),
        })))
    }

    fn new_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let new_tok = st.expect(TokenKind::New, "new expression")?;
        let ty = self.type_expr(st, 0)?;
        self.validate_type(&ty);
        Ok(Expression::New(NewExpression {
            ty,
            pos: new_tok.pos(),
        }))
    }

    fn if_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let if_tok = st.expect(TokenKind::If, "if expression")?;
        let condition = self.expr(st, 0)?;
        st.expect(TokenKind::Then, "if expression")?;
        let then_expr = self.expr(st, THEN_RBP)?;
        let else_expr = if st.peek_kind() == Some(TokenKind::Else) {
            st.next();
            Some(self.expr(st, ELSE_RBP)?)
        } else {
            None
        };
        Ok(Expression::If(Box::new(IfExpression {
            condition,
            then_expr,
            else_expr,
            pos: if_tok.pos(),
        })))
    }

    fn while_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let while_tok = st.expect(TokenKind::While, "while expression")?;
        let condition = self.expr(st, 0)?;
        st.expect(TokenKind::Do, "while expression")?;
        let body = self.expr(st, 0)?;
        st.expect(TokenKind::Done, "while expression")?;
        Ok(Expression::While(Box::new(WhileExpression {
            condition,
            body,
            pos: while_tok.pos(),
        })))
    }

    fn for_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let for_tok = st.expect(TokenKind::For, "for expression")?;
        let counter_tok = st.expect(TokenKind::Genid, "for expression")?;
        st.expect(TokenKind::Eq, "for expression")?;
        let start = self.expr(st, 0)?;

        let down = match st.peek_kind() {
            Some(TokenKind::To) => false,
            Some(TokenKind::Downto) => true,
            _ => {
                return Err(match st.peek() {
                    Some(tok) => ParseError::on_token(tok),
                    None => ParseError::eof("for expression"),
                })
            }
        };
        st.next();

        let stop = self.expr(st, 0)?;
        st.expect(TokenKind::Do, "for expression")?;
        let body = self.expr(st, 0)?;
        st.expect(TokenKind::Done, "for expression")?;

        Ok(Expression::For(Box::new(ForExpression {
            counter: ident_text(&counter_tok),
            start,
            stop,
            body,
            down,
            pos: for_tok.pos(),
        })))
    }

    fn match_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let match_tok = st.expect(TokenKind::Match, "match expression")?;
        let expr = self.expr(st, 0)?;
        st.expect(TokenKind::With, "match expression")?;

        let mut clauses = vec![self.clause(st)?];
        while st.peek_kind() == Some(TokenKind::Pipe) {
            st.next();
            clauses.push(self.clause(st)?);
        }
        st.expect(TokenKind::End, "match expression")?;

        Ok(Expression::Match(Box::new(MatchExpression {
            expr,
            clauses,
            pos: match_tok.pos(),
        })))
    }

    fn clause(&mut self, st: &mut ParseState) -> Result<Clause, ParseError> {
        let pattern = self.pattern(st)?;
        st.expect(TokenKind::Arrow, "match clause")?;
        let expr = self.expr(st, 0)?;
        let pos = pattern.pos();
        Ok(Clause { pattern, expr, pos })
    }

    fn dim_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let dim_tok = st.expect(TokenKind::Dim, "dim expression")?;
        let dimension = if st.peek_kind() == Some(TokenKind::IntConst) {
            let tok = st.next().expect("peeked");
            match tok.value {
                TokenValue::Int(n) => n,
                _ => 1,
            }
        } else {
            1
        };
        let name_tok = st.expect(TokenKind::Genid, "dim expression")?;
        Ok(Expression::Dim(DimExpression {
            name: ident_text(&name_tok),
            dimension,
            pos: dim_tok.pos(),
        }))
    }

    fn begin_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let begin_tok = st.expect(TokenKind::Begin, "begin expression")?;
        let mut expr = self.expr(st, 0)?;
        st.expect(TokenKind::End, "begin expression")?;
        expr.set_pos(begin_tok.pos());
        Ok(expr)
    }

    fn let_in_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let letdef = self.letdef(st)?;
        st.expect(TokenKind::In, "let-in expression")?;
        let expr = self.expr(st, 0)?;
        let pos = letdef.pos;
        Ok(Expression::LetIn(Box::new(LetInExpression {
            letdef,
            expr,
            pos,
        })))
    }

    /// A `GENID` in expression position: array indexing, an application, or
    /// a plain identifier reference.
    fn genid_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let tok = st.expect(TokenKind::Genid, "identifier")?;

        if st.peek_kind() == Some(TokenKind::LBracket) {
            return self.index_expr(st, &tok);
        }

        if st
            .peek_kind()
            .map(is_simple_start)
            .unwrap_or(false)
        {
            let args = self.arg_seq(st)?;
            return Ok(Expression::Call(FunctionCallExpression {
                name: ident_text(&tok),
                args,
                pos: tok.pos(),
            }));
        }

        Ok(Expression::Genid(GenidExpression {
            name: ident_text(&tok),
            pos: tok.pos(),
        }))
    }

    /// A `CONID` in expression position: a constructor call or a bare
    /// constructor reference.
    fn conid_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let tok = st.expect(TokenKind::Conid, "constructor identifier")?;

        if st
            .peek_kind()
            .map(is_simple_start)
            .unwrap_or(false)
        {
            let args = self.arg_seq(st)?;
            return Ok(Expression::ConstructorCall(ConstructorCallExpression {
                name: ident_text(&tok),
                args,
                pos: tok.pos(),
            }));
        }

        Ok(Expression::Conid(ConidExpression {
            name: ident_text(&tok),
            pos: tok.pos(),
        }))
    }

    fn index_expr(&mut self, st: &mut ParseState, name_tok: &Token) -> Result<Expression, ParseError> {
        st.expect(TokenKind::LBracket, "array indexing")?;
        let mut indices = vec![self.expr(st, 0)?];
        while st.peek_kind() == Some(TokenKind::Comma) {
            st.next();
            indices.push(self.expr(st, 0)?);
        }
        st.expect(TokenKind::RBracket, "array indexing")?;
        Ok(Expression::ArrayIndex(ArrayExpression {
            name: ident_text(name_tok),
            indices,
            pos: name_tok.pos(),
        }))
    }

    /// One or more application arguments, each a simple expression with
    /// optional `!` prefixes.
    fn arg_seq(&mut self, st: &mut ParseState) -> Result<Vec<Expression>, ParseError> {
        let mut args = vec![];
        loop {
            let arg = match st.peek_kind() {
                Some(TokenKind::Bang) => self.bang_expr(st)?,
                _ => self.simple_atom(st)?,
            };
            args.push(arg);
            if !st.peek_kind().map(is_simple_start).unwrap_or(false) {
                break;
            }
        }
        Ok(args)
    }

    /// A simple expression: a constant, an identifier (possibly indexed), a
    /// bare constructor, or a parenthesized expression. Applications do not
    /// nest here without parentheses.
    fn simple_atom(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let tok = match st.peek() {
            Some(tok) => tok.clone(),
            None => return Err(ParseError::eof("simple expression")),
        };

        match tok.kind {
            TokenKind::Genid => {
                st.next();
                if st.peek_kind() == Some(TokenKind::LBracket) {
                    return self.index_expr(st, &tok);
                }
                Ok(Expression::Genid(GenidExpression {
                    name: ident_text(&tok),
                    pos: tok.pos(),
                }))
            }
            TokenKind::Conid => {
                st.next();
                Ok(Expression::Conid(ConidExpression {
                    name: ident_text(&tok),
                    pos: tok.pos(),
                }))
            }
            TokenKind::Bang => self.bang_expr(st),
            TokenKind::LParen => self.paren_expr(st),
            TokenKind::IntConst
            | TokenKind::FloatConst
            | TokenKind::CharConst
            | TokenKind::StringConst
            | TokenKind::True
            | TokenKind::False => {
                st.next();
                Ok(const_expr(&tok))
            }
            _ => Err(ParseError::on_token(&tok)),
        }
    }

    /// `( )` is the unit constant; `( e )` re-positions `e` at the paren.
    fn paren_expr(&mut self, st: &mut ParseState) -> Result<Expression, ParseError> {
        let lparen = st.expect(TokenKind::LParen, "parenthesized expression")?;
        if st.peek_kind() == Some(TokenKind::RParen) {
            st.next();
            let mut unit = ConstExpression::new(Type::unit(), ConstValue::Unit);
            unit.pos = lparen.pos();
            return Ok(Expression::Const(unit));
        }
        let mut expr = self.expr(st, 0)?;
        st.expect(TokenKind::RParen, "parenthesized expression")?;
        expr.set_pos(lparen.pos());
        Ok(expr)
    }

    pub(crate) fn pattern(&mut self, st: &mut ParseState) -> Result<Pattern, ParseError> {
        if st.peek_kind() == Some(TokenKind::Conid) {
            let tok = st.next().expect("peeked");
            let mut args = vec![];
            while st
                .peek_kind()
                .map(is_simple_pattern_start)
                .unwrap_or(false)
            {
                args.push(self.simple_pattern(st)?);
            }
            return Ok(Pattern::Constructor(ConstructorPattern {
                name: ident_text(&tok),
                args,
                pos: tok.pos(),
            }));
        }
        self.simple_pattern(st)
    }

    fn simple_pattern(&mut self, st: &mut ParseState) -> Result<Pattern, ParseError> {
        let tok = match st.peek() {
            Some(tok) => tok.clone(),
            None => return Err(ParseError::eof("pattern")),
        };

        match tok.kind {
            TokenKind::True
            | TokenKind::False
            | TokenKind::IntConst
            | TokenKind::FloatConst
            | TokenKind::CharConst => {
                st.next();
                let Expression::Const(c) = const_expr(&tok) else {
                    unreachable!()
                };
                Ok(Pattern::Const(c))
            }
            TokenKind::Plus | TokenKind::Minus => {
                st.next();
                let value_tok = st.expect(TokenKind::IntConst, "integer pattern")?;
                let value = match value_tok.value {
                    TokenValue::Int(n) => n,
                    _ => 0,
                };
                let value = if tok.kind == TokenKind::Minus { -value } else { value };
                let mut c = ConstExpression::new(Type::int(), ConstValue::Int(value));
                c.pos = tok.pos();
                Ok(Pattern::Const(c))
            }
            TokenKind::FPlus | TokenKind::FMinus => {
                st.next();
                let value_tok = st.expect(TokenKind::FloatConst, "float pattern")?;
                let value = match value_tok.value {
                    TokenValue::Float(x) => x,
                    _ => 0.0,
                };
                let value = if tok.kind == TokenKind::FMinus { -value } else { value };
                let mut c = ConstExpression::new(Type::float(), ConstValue::Float(value));
                c.pos = tok.pos();
                Ok(Pattern::Const(c))
            }
            TokenKind::Genid => {
                st.next();
                Ok(Pattern::Genid(GenidPattern {
                    name: ident_text(&tok),
                    pos: tok.pos(),
                }))
            }
            TokenKind::LParen => {
                st.next();
                let mut pattern = self.pattern(st)?;
                st.expect(TokenKind::RParen, "parenthesized pattern")?;
                pattern.set_pos(tok.pos());
                Ok(pattern)
            }
            _ => Err(ParseError::on_token(&tok)),
        }
    }
}

/// Build the constant expression for a literal token.
fn const_expr(tok: &Token) -> Expression {
    let (ty, value) = match (&tok.kind, &tok.value) {
        (TokenKind::IntConst, TokenValue::Int(n)) => (Type::int(), ConstValue::Int(*n)),
        (TokenKind::FloatConst, TokenValue::Float(x)) => (Type::float(), ConstValue::Float(*x)),
        (TokenKind::CharConst, TokenValue::Char(c)) => (Type::char(), ConstValue::Char(*c)),
        (TokenKind::StringConst, TokenValue::Bytes(bytes)) => {
            (Type::string(), ConstValue::Str(bytes.clone()))
        }
        (TokenKind::True, _) => (Type::bool(), ConstValue::Bool(true)),
        (TokenKind::False, _) => (Type::bool(), ConstValue::Bool(false)),
        _ => (Type::unit(), ConstValue::Unit),
    };
    let mut c = ConstExpression::new(ty, value);
    c.pos = tok.pos();
    Expression::Const(c)
}
