use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::{debug, trace};

use crate::error::{Error, Result};

/// Reserved symbol standing for the empty string. It is part of every
/// alphabet but never a symbol an automaton transitions on.
pub const EPSILON: &str = "ε";

lazy_static! {
    static ref OPERATORS: HashMap<char, TokenKind> = {
        let mut m = HashMap::new();
        m.insert('+', TokenKind::Or);
        m.insert('*', TokenKind::Star);
        m.insert('(', TokenKind::OpenParen);
        m.insert(')', TokenKind::CloseParen);
        m.insert('{', TokenKind::OpenBrace);
        m.insert('}', TokenKind::CloseBrace);
        m.insert(',', TokenKind::Comma);
        m
    };
}

/// Set of symbols a regex is written over. Symbols may be longer than one
/// character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: BTreeSet<String>,
}

impl Alphabet {
    /// Builds an alphabet from the given symbols. Empty strings are ignored
    /// and the epsilon symbol is always added.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: BTreeSet<String> = symbols
            .into_iter()
            .map(|s| s.into())
            .filter(|s: &String| !s.is_empty())
            .collect();
        set.insert(EPSILON.to_owned());
        Alphabet { symbols: set }
    }

    /// Splits a whitespace or comma separated list like `"a b STOP"`.
    pub fn parse_list(list: &str) -> Self {
        Alphabet::new(
            list.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Symbols usable as transition labels (everything except epsilon).
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .map(|s| s.as_str())
            .filter(|s| *s != EPSILON)
    }

    /// The longest member of the alphabet that `input` starts with.
    pub fn longest_prefix_of(&self, input: &str) -> Option<&str> {
        self.symbols
            .iter()
            .filter(|s| input.starts_with(s.as_str()))
            .max_by_key(|s| s.len())
            .map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Or,
    Star,
    OpenParen,
    CloseParen,
    Literal,
    OpenBrace,
    CloseBrace,
    /// Numeric bound inside a repetition quantifier.
    MetaChar,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, content: S) -> Self {
        Token {
            kind,
            content: content.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} '{}'", self.kind, self.content)
    }
}

/// Splits a regex into tokens using longest-match against the alphabet.
pub struct Lexer<'a> {
    input: &'a str,
    alphabet: &'a Alphabet,
    /// Byte offset into `input`.
    offset: usize,
    /// Character position, used for error messages.
    position: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, alphabet: &'a Alphabet) -> Self {
        Lexer {
            input,
            alphabet,
            offset: 0,
            position: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let input = self.input;
        let alphabet = self.alphabet;

        while let Some(c) = self.peek() {
            let rest = &input[self.offset..];
            if let Some(symbol) = alphabet.longest_prefix_of(rest) {
                trace!("literal '{}' at {}", symbol, self.position);
                self.tokens.push(Token::new(TokenKind::Literal, symbol));
                self.advance_by(symbol);
                continue;
            }

            let kind = match OPERATORS.get(&c) {
                Some(kind) => *kind,
                None => {
                    return Err(Error::lexical(
                        self.position,
                        format!("character '{}' is not in the alphabet", c),
                    ))
                }
            };

            self.bump();
            self.tokens.push(Token::new(kind, c.to_string()));

            if kind == TokenKind::OpenBrace {
                self.quantifier()?;
            }
        }

        debug!("lexed {:?} into {} tokens", self.input, self.tokens.len());
        Ok(self.tokens)
    }

    /// Lexes the remainder of `{n}`, `{n,m}` or `{n,}` after the opening brace.
    fn quantifier(&mut self) -> Result<()> {
        let low = self.number()?;

        match self.peek() {
            Some('}') => {
                self.bump();
                self.tokens.push(Token::new(TokenKind::CloseBrace, "}"));
                Ok(())
            }
            Some(',') => {
                self.bump();
                self.tokens.push(Token::new(TokenKind::Comma, ","));

                if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    let start = self.position;
                    let high = self.number()?;
                    if high < low {
                        return Err(Error::lexical(
                            start,
                            format!(
                                "repetition upper bound {} is less than lower bound {}",
                                high, low
                            ),
                        ));
                    }
                }

                match self.peek() {
                    Some('}') => {
                        self.bump();
                        self.tokens.push(Token::new(TokenKind::CloseBrace, "}"));
                        Ok(())
                    }
                    Some(c) => Err(Error::lexical(
                        self.position,
                        format!("malformed repetition: expected '}}', found '{}'", c),
                    )),
                    None => Err(Error::lexical(
                        self.position,
                        "malformed repetition: missing '}'",
                    )),
                }
            }
            Some(c) => Err(Error::lexical(
                self.position,
                format!("malformed repetition: expected ',' or '}}', found '{}'", c),
            )),
            None => Err(Error::lexical(
                self.position,
                "malformed repetition: missing '}'",
            )),
        }
    }

    /// Reads a non-empty run of digits and pushes it as a MetaChar token.
    fn number(&mut self) -> Result<u32> {
        let start_offset = self.offset;
        let start = self.position;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
        }

        let digits = &self.input[start_offset..self.offset];
        if digits.is_empty() {
            return Err(match self.peek() {
                Some(c) => Error::lexical(
                    start,
                    format!("expected a repetition count, found '{}'", c),
                ),
                None => Error::lexical(start, "expected a repetition count"),
            });
        }

        let value = digits.parse::<u32>().map_err(|_| {
            Error::lexical(start, format!("repetition count {} is too large", digits))
        })?;

        self.tokens.push(Token::new(TokenKind::MetaChar, digits));
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.offset += c.len_utf8();
            self.position += 1;
        }
    }

    fn advance_by(&mut self, symbol: &str) {
        self.offset += symbol.len();
        self.position += symbol.chars().count();
    }
}

/// Tokenizes `regex` over `alphabet`.
pub fn tokenize(regex: &str, alphabet: &Alphabet) -> Result<Vec<Token>> {
    Lexer::new(regex, alphabet).tokenize()
}
