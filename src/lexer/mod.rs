//! Lexer for the Llama language.
//!
//! A hand-written byte scanner with exclusive states for nested block
//! comments and for recovering from malformed character/string literals.
//! Tokens carry 1-based line/column positions; columns are computed from a
//! beginning-of-line pointer so they survive arbitrary line lengths.

mod token;

pub use token::*;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::diagnostics::{shared, Logger, SharedLogger};

macro_rules! reserved {
    ($map:ident, $name:ident, $word:expr) => {
        $map.insert($word, TokenKind::$name);
    };
}

static RESERVED: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();

    reserved!(m, And, "and");
    reserved!(m, Array, "array");
    reserved!(m, Begin, "begin");
    reserved!(m, Bool, "bool");
    reserved!(m, Char, "char");
    reserved!(m, Delete, "delete");
    reserved!(m, Dim, "dim");
    reserved!(m, Do, "do");
    reserved!(m, Done, "done");
    reserved!(m, Downto, "downto");
    reserved!(m, Else, "else");
    reserved!(m, End, "end");
    reserved!(m, Float, "float");
    reserved!(m, For, "for");
    reserved!(m, If, "if");
    reserved!(m, In, "in");
    reserved!(m, Int, "int");
    reserved!(m, Let, "let");
    reserved!(m, Match, "match");
    reserved!(m, Mod, "mod");
    reserved!(m, Mutable, "mutable");
    reserved!(m, New, "new");
    reserved!(m, Not, "not");
    reserved!(m, Of, "of");
    reserved!(m, Rec, "rec");
    reserved!(m, Ref, "ref");
    reserved!(m, Then, "then");
    reserved!(m, To, "to");
    reserved!(m, Type, "type");
    reserved!(m, Unit, "unit");
    reserved!(m, While, "while");
    reserved!(m, With, "with");
    reserved!(m, True, "true");
    reserved!(m, False, "false");

    m
});

/// Exclusive lexer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    /// Inside a `(* ... *)` block comment; the nesting level lives in `level`.
    Comment,
    /// Recovering from a malformed character literal.
    Char,
    /// Recovering from a malformed string literal.
    String,
}

/// A Llama lexer over a single in-memory input.
///
/// Feeding new input with [`Lexer::input`] resets every piece of state:
/// line counter, beginning-of-line pointer, comment nesting and the shared
/// logger. The same text therefore always produces the same token sequence.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    /// Byte index just before the current line; `col = pos - bol`.
    bol: isize,
    /// Levels of nested comment blocks still open.
    level: usize,
    state: State,
    logger: SharedLogger,
    verbose: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, logger: SharedLogger) -> Self {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            bol: -1,
            level: 0,
            state: State::Initial,
            logger,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Feed the lexer with fresh input and reset all state.
    pub fn input(&mut self, data: &'a str) {
        self.input = data.as_bytes();
        self.pos = 0;
        self.line = 1;
        self.bol = -1;
        self.level = 0;
        self.state = State::Initial;
        self.logger.borrow_mut().clear();
    }

    /// Skip `amount` bytes of input.
    pub fn skip(&mut self, amount: usize) {
        self.pos += amount;
    }

    /// Re-feed input and iterate over its tokens.
    pub fn tokenize(&mut self, data: &'a str) -> &mut Self {
        self.input(data);
        self
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn byte_at(&self, at: usize) -> Option<u8> {
        self.input.get(at).copied()
    }

    fn col_at(&self, at: usize) -> usize {
        (at as isize - self.bol) as usize
    }

    fn newline(&mut self) {
        self.bol = self.pos as isize;
        self.pos += 1;
        self.line += 1;
    }

    fn error(&mut self, msg: String) {
        self.logger.borrow_mut().error(msg);
    }

    fn emit(&mut self, tok: Token) -> Token {
        if self.verbose {
            self.logger.borrow_mut().debug(format!(
                "{}:{}\t{}\t{}",
                tok.line, tok.col, tok.kind, tok.value
            ));
        }
        tok
    }

    /// Return the next token, or `None` once the input is exhausted.
    /// Reaching the end of the input inside a comment, char or string state
    /// reports the unclosed construct.
    pub fn token(&mut self) -> Option<Token> {
        loop {
            match self.state {
                State::Initial => {
                    let b = self.peek()?;
                    match b {
                        b'\n' => self.newline(),
                        b' ' | b'\t' | b'\r' => self.pos += 1,
                        b'-' if self.byte_at(self.pos + 1) == Some(b'-') => {
                            // Single-line comment; the newline is not consumed.
                            self.pos += 2;
                            while let Some(c) = self.peek() {
                                if c == b'\n' {
                                    break;
                                }
                                self.pos += 1;
                            }
                        }
                        b'(' if self.byte_at(self.pos + 1) == Some(b'*') => {
                            self.pos += 2;
                            self.level = 1;
                            self.state = State::Comment;
                        }
                        b'\'' => {
                            if let Some(tok) = self.lex_char() {
                                return Some(self.emit(tok));
                            }
                        }
                        b'"' => {
                            if let Some(tok) = self.lex_string() {
                                return Some(self.emit(tok));
                            }
                        }
                        b'a'..=b'z' => {
                            let tok = self.lex_genid();
                            return Some(self.emit(tok));
                        }
                        b'A'..=b'Z' => {
                            let tok = self.lex_conid();
                            return Some(self.emit(tok));
                        }
                        b'0'..=b'9' => {
                            let tok = self.lex_number();
                            return Some(self.emit(tok));
                        }
                        _ => {
                            if let Some(tok) = self.lex_special() {
                                return Some(self.emit(tok));
                            }
                        }
                    }
                }
                State::Comment => match self.peek() {
                    None => {
                        self.error(format!(
                            "{}: error: Unclosed comment reaching end of file.",
                            self.line
                        ));
                        self.state = State::Initial;
                        return None;
                    }
                    Some(b'\n') => self.newline(),
                    Some(b'(') if self.byte_at(self.pos + 1) == Some(b'*') => {
                        self.pos += 2;
                        self.level += 1;
                    }
                    Some(b'*') if self.byte_at(self.pos + 1) == Some(b')') => {
                        self.pos += 2;
                        if self.level > 1 {
                            self.level -= 1;
                        } else {
                            self.level = 0;
                            self.state = State::Initial;
                        }
                    }
                    Some(_) => self.pos += 1,
                },
                State::Char => match self.peek() {
                    None => {
                        self.error(format!(
                            "{}: error: Unclosed character literal at end of file.",
                            self.line
                        ));
                        self.state = State::Initial;
                        return None;
                    }
                    Some(b'\n') => self.newline(),
                    Some(b'\'') => {
                        let tok = Token::new(
                            TokenKind::CharConst,
                            TokenValue::Char(0),
                            self.line,
                            self.col_at(self.pos),
                        );
                        self.pos += 1;
                        self.state = State::Initial;
                        return Some(self.emit(tok));
                    }
                    Some(_) => self.pos += 1,
                },
                State::String => match self.peek() {
                    None => {
                        self.error(format!(
                            "{}: error: Unclosed string reaching end of file.",
                            self.line
                        ));
                        self.state = State::Initial;
                        return None;
                    }
                    Some(b'\n') => self.newline(),
                    Some(b'"') => {
                        let tok = Token::new(
                            TokenKind::StringConst,
                            TokenValue::Bytes(vec![0]),
                            self.line,
                            self.col_at(self.pos),
                        );
                        self.pos += 1;
                        self.state = State::Initial;
                        return Some(self.emit(tok));
                    }
                    Some(_) => self.pos += 1,
                },
            }
        }
    }

    fn lex_genid(&mut self) -> Token {
        let start = self.pos;
        let (line, col) = (self.line, self.col_at(self.pos));
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = std::str::from_utf8(&self.input[start..self.pos]).unwrap();

        if let Some((&spelling, &kind)) = RESERVED.get_key_value(word) {
            let value = match kind {
                TokenKind::True => TokenValue::Bool(true),
                TokenKind::False => TokenValue::Bool(false),
                _ => TokenValue::Word(spelling),
            };
            Token::new(kind, value, line, col)
        } else {
            Token::new(
                TokenKind::Genid,
                TokenValue::Ident(word.to_string()),
                line,
                col,
            )
        }
    }

    fn lex_conid(&mut self) -> Token {
        let start = self.pos;
        let (line, col) = (self.line, self.col_at(self.pos));
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = std::str::from_utf8(&self.input[start..self.pos]).unwrap();
        Token::new(
            TokenKind::Conid,
            TokenValue::Ident(word.to_string()),
            line,
            col,
        )
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        let (line, col) = (self.line, self.col_at(self.pos));
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }

        let is_float = self.peek() == Some(b'.')
            && matches!(self.byte_at(self.pos + 1), Some(b'0'..=b'9'));
        if !is_float {
            let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap();
            let value = match text.parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    self.error(format!(
                        "{}:{}: error: Integer constant is irrepresentable.",
                        line, col
                    ));
                    0
                }
            };
            return Token::new(TokenKind::IntConst, TokenValue::Int(value), line, col);
        }

        self.pos += 1;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        // Only consume an exponent when it is complete; `1.5e` lexes as the
        // float `1.5` followed by the identifier `e`.
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mut after = self.pos + 1;
            if matches!(self.byte_at(after), Some(b'+') | Some(b'-')) {
                after += 1;
            }
            if matches!(self.byte_at(after), Some(b'0'..=b'9')) {
                self.pos = after;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap();
        let mut value = text.parse::<f64>().unwrap_or(f64::INFINITY);
        if value.is_infinite() {
            self.error(format!(
                "{}:{}: error: Floating-point constant is irrepresentable.",
                line, col
            ));
            value = 0.0;
        }
        Token::new(TokenKind::FloatConst, TokenValue::Float(value), line, col)
    }

    /// Decode one character payload at `at`: a printable ASCII byte other
    /// than quotes/backslash, a named escape, or `\xHH`. Returns the decoded
    /// byte and the consumed length.
    fn scan_char_payload(&self, at: usize) -> Option<(u8, usize)> {
        match self.byte_at(at)? {
            b'\\' => match self.byte_at(at + 1)? {
                b'n' => Some((b'\n', 2)),
                b't' => Some((b'\t', 2)),
                b'r' => Some((b'\r', 2)),
                b'0' => Some((0, 2)),
                b'\\' => Some((b'\\', 2)),
                b'\'' => Some((b'\'', 2)),
                b'"' => Some((b'"', 2)),
                b'x' => {
                    let hi = hex_digit(self.byte_at(at + 2)?)?;
                    let lo = hex_digit(self.byte_at(at + 3)?)?;
                    Some((hi * 16 + lo, 4))
                }
                _ => None,
            },
            b'"' | b'\'' => None,
            c if (0x20..=0x7e).contains(&c) => Some((c, 1)),
            _ => None,
        }
    }

    /// Lex a character literal, or enter recovery on a malformed one.
    fn lex_char(&mut self) -> Option<Token> {
        let start = self.pos;
        let (line, col) = (self.line, self.col_at(self.pos));

        if self.byte_at(start + 1) == Some(b'\'') {
            self.pos = start + 2;
            self.error(format!(
                "{}:{}: error: Empty character literal not allowed.",
                line, col
            ));
            return Some(Token::new(
                TokenKind::CharConst,
                TokenValue::Char(0),
                line,
                col,
            ));
        }

        if let Some((value, len)) = self.scan_char_payload(start + 1) {
            if self.byte_at(start + 1 + len) == Some(b'\'') {
                self.pos = start + len + 2;
                return Some(Token::new(
                    TokenKind::CharConst,
                    TokenValue::Char(value),
                    line,
                    col,
                ));
            }
        }

        self.error(format!("{}:{}: error: Bad character literal.", line, col));
        self.pos = start + 1;
        self.state = State::Char;
        None
    }

    /// Lex a string literal, or enter recovery on a malformed one.
    fn lex_string(&mut self) -> Option<Token> {
        let start = self.pos;
        let (line, col) = (self.line, self.col_at(self.pos));

        let mut bytes = vec![];
        let mut at = start + 1;
        loop {
            match self.byte_at(at) {
                Some(b'"') => {
                    bytes.push(0);
                    self.pos = at + 1;
                    return Some(Token::new(
                        TokenKind::StringConst,
                        TokenValue::Bytes(bytes),
                        line,
                        col,
                    ));
                }
                _ => match self.scan_char_payload(at) {
                    Some((value, len)) => {
                        bytes.push(value);
                        at += len;
                    }
                    None => break,
                },
            }
        }

        self.error(format!("{}:{}: error: Bad string literal.", line, col));
        self.pos = start + 1;
        self.state = State::String;
        None
    }

    /// Lex operators and delimiters, longest match first. Anything that
    /// matches nothing is reported and skipped (panic recovery).
    fn lex_special(&mut self) -> Option<Token> {
        let (line, col) = (self.line, self.col_at(self.pos));
        let b = self.peek()?;
        let next = self.byte_at(self.pos + 1);

        let (kind, len) = match (b, next) {
            (b'+', Some(b'.')) => (TokenKind::FPlus, 2),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', Some(b'.')) => (TokenKind::FMinus, 2),
            (b'-', Some(b'>')) => (TokenKind::Arrow, 2),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', Some(b'*')) => (TokenKind::FPow, 2),
            (b'*', Some(b'.')) => (TokenKind::FTimes, 2),
            (b'*', _) => (TokenKind::Times, 1),
            (b'/', Some(b'.')) => (TokenKind::FDivide, 2),
            (b'/', _) => (TokenKind::Divide, 1),
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'<', Some(b'>')) => (TokenKind::Neq, 2),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'=', Some(b'=')) => (TokenKind::NatEq, 2),
            (b'=', _) => (TokenKind::Eq, 1),
            (b'!', Some(b'=')) => (TokenKind::NatNeq, 2),
            (b'!', _) => (TokenKind::Bang, 1),
            (b'&', Some(b'&')) => (TokenKind::BAnd, 2),
            (b'|', Some(b'|')) => (TokenKind::BOr, 2),
            (b'|', _) => (TokenKind::Pipe, 1),
            (b':', Some(b'=')) => (TokenKind::Assign, 2),
            (b':', _) => (TokenKind::Colon, 1),
            (b';', _) => (TokenKind::Semicolon, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'[', _) => (TokenKind::LBracket, 1),
            (b']', _) => (TokenKind::RBracket, 1),
            (b',', _) => (TokenKind::Comma, 1),
            _ => {
                self.error(format!(
                    "{}:{}: error: Illegal character '{}'.",
                    line, col, b as char
                ));
                self.pos += 1;
                self.state = State::Initial;
                return None;
            }
        };

        self.pos += len;
        Some(Token::new(kind, TokenValue::None, line, col))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.token()
    }
}

/// Lex `data` with a dedicated lexer and the given logger.
pub fn tokenize(data: &str, logger: SharedLogger) -> Vec<Token> {
    Lexer::new(data, logger).collect()
}

/// Lex `data`, silencing all diagnostics.
pub fn quiet_tokenize(data: &str) -> Vec<Token> {
    tokenize(data, shared(Logger::mock()))
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
