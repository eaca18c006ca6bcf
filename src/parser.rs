use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind, EPSILON};

/// Syntax tree of a regex. Every node other than `Literal` owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single alphabet symbol, or the empty string when it is epsilon.
    Literal(String),
    Seq(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Star(Box<Node>),
    RepeatExactly(Box<Node>, u32),
    /// Inclusive on both ends.
    RepeatBetween(Box<Node>, u32, u32),
    RepeatMin(Box<Node>, u32),
}

impl Node {
    pub fn literal<S: Into<String>>(symbol: S) -> Self {
        Node::Literal(symbol.into())
    }

    pub fn seq(left: Node, right: Node) -> Self {
        Node::Seq(Box::new(left), Box::new(right))
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Or(Box::new(left), Box::new(right))
    }

    pub fn star(sub: Node) -> Self {
        Node::Star(Box::new(sub))
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Node::Literal(s) if s == EPSILON)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);
        match self {
            Node::Literal(s) => writeln!(f, "{}LITERAL: {}", pad, s),
            Node::Seq(l, r) => {
                writeln!(f, "{}SEQ", pad)?;
                l.fmt_indented(f, indent + 2)?;
                r.fmt_indented(f, indent + 2)
            }
            Node::Or(l, r) => {
                writeln!(f, "{}OR", pad)?;
                l.fmt_indented(f, indent + 2)?;
                r.fmt_indented(f, indent + 2)
            }
            Node::Star(sub) => {
                writeln!(f, "{}STAR", pad)?;
                sub.fmt_indented(f, indent + 2)
            }
            Node::RepeatExactly(sub, n) => {
                writeln!(f, "{}REPEAT_EXACTLY: {}", pad, n)?;
                sub.fmt_indented(f, indent + 2)
            }
            Node::RepeatBetween(sub, low, high) => {
                writeln!(f, "{}REPEAT_BETWEEN: {}-{}", pad, low, high)?;
                sub.fmt_indented(f, indent + 2)
            }
            Node::RepeatMin(sub, min) => {
                writeln!(f, "{}REPEAT_MIN: {}", pad, min)?;
                sub.fmt_indented(f, indent + 2)
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Recursive descent parser over the token stream.
///
/// ```text
/// expression := term ('+' expression)?
/// term       := character character*
/// character  := (literal | '(' expression ')') quantifier? '*'?
/// quantifier := '{' NUM '}' | '{' NUM ',' NUM '}' | '{' NUM ',' '}'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parses the whole stream into a single tree.
    pub fn parse(mut self) -> Result<Node> {
        let root = self.expression()?;
        if let Some(token) = self.peek() {
            return Err(Error::Syntax(format!(
                "unexpected {} at token {} after a complete expression",
                token, self.pos
            )));
        }

        debug!("parsed {} tokens", self.tokens.len());
        Ok(root)
    }

    fn expression(&mut self) -> Result<Node> {
        let left = self.term()?;
        if self.check(TokenKind::Or) {
            let right = self.expression()?;
            return Ok(Node::or(left, right));
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Node> {
        let mut node = self.character()?;
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Literal && token.kind != TokenKind::OpenParen {
                break;
            }

            let right = self.character()?;
            node = Node::seq(node, right);
        }

        Ok(node)
    }

    fn character(&mut self) -> Result<Node> {
        let mut node = match self.peek().map(|t| t.kind) {
            Some(TokenKind::Literal) => {
                let symbol = self.tokens[self.pos].content.clone();
                self.pos += 1;
                Node::Literal(symbol)
            }
            Some(TokenKind::OpenParen) => {
                self.pos += 1;
                let inner = self.expression()?;
                self.expect(TokenKind::CloseParen)?;
                inner
            }
            _ => return Err(self.unexpected("a symbol or '('")),
        };

        if self.check(TokenKind::OpenBrace) {
            node = self.quantifier(node)?;
        }

        if self.check(TokenKind::Star) {
            node = Node::star(node);
        }

        Ok(node)
    }

    /// Wraps `sub` in the repetition following an already consumed '{'.
    fn quantifier(&mut self, sub: Node) -> Result<Node> {
        let low = self.count()?;

        if self.check(TokenKind::CloseBrace) {
            return Ok(Node::RepeatExactly(Box::new(sub), low));
        }

        self.expect(TokenKind::Comma)?;

        if self.check(TokenKind::CloseBrace) {
            return Ok(Node::RepeatMin(Box::new(sub), low));
        }

        let high = self.count()?;
        if high < low {
            return Err(Error::Syntax(format!(
                "repetition bounds {{{},{}}} are reversed",
                low, high
            )));
        }

        self.expect(TokenKind::CloseBrace)?;
        Ok(Node::RepeatBetween(Box::new(sub), low, high))
    }

    fn count(&mut self) -> Result<u32> {
        let value = match self.peek() {
            Some(token) if token.kind == TokenKind::MetaChar => {
                token.content.parse::<u32>().map_err(|_| {
                    Error::Syntax(format!("invalid repetition count '{}'", token.content))
                })?
            }
            _ => return Err(self.unexpected("a repetition count")),
        };

        self.pos += 1;
        Ok(value)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes the next token if it has the given kind.
    fn check(&mut self, kind: TokenKind) -> bool {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.check(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("{:?}", kind)))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => Error::Syntax(format!(
                "expected {} but found {} at token {}",
                expected, token, self.pos
            )),
            None => Error::Syntax(format!("expected {} but reached end of input", expected)),
        }
    }
}

/// Parses a token stream produced by the lexer.
pub fn parse(tokens: Vec<Token>) -> Result<Node> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, Alphabet};

    fn parse_str(regex: &str, symbols: &[&str]) -> Result<Node> {
        let alphabet = Alphabet::new(symbols.iter().cloned());
        parse(tokenize(regex, &alphabet)?)
    }

    fn lit(s: &str) -> Node {
        Node::literal(s)
    }

    #[test]
    fn literal() {
        assert_eq!(parse_str("a", &["a"]).unwrap(), lit("a"));
    }

    #[test]
    fn sequence_folds_left() {
        assert_eq!(
            parse_str("abc", &["a", "b", "c"]).unwrap(),
            Node::seq(Node::seq(lit("a"), lit("b")), lit("c"))
        );
    }

    #[test]
    fn or_is_right_associative() {
        assert_eq!(
            parse_str("a+b+c", &["a", "b", "c"]).unwrap(),
            Node::or(lit("a"), Node::or(lit("b"), lit("c")))
        );
    }

    #[test]
    fn concatenation_binds_tighter_than_or() {
        assert_eq!(
            parse_str("ab+a", &["a", "b"]).unwrap(),
            Node::or(Node::seq(lit("a"), lit("b")), lit("a"))
        );
    }

    #[test]
    fn star_and_groups() {
        assert_eq!(parse_str("b*", &["b"]).unwrap(), Node::star(lit("b")));
        assert_eq!(
            parse_str("(a+b)c", &["a", "b", "c"]).unwrap(),
            Node::seq(Node::or(lit("a"), lit("b")), lit("c"))
        );
    }

    #[test]
    fn repetitions() {
        assert_eq!(
            parse_str("a{2}", &["a"]).unwrap(),
            Node::RepeatExactly(Box::new(lit("a")), 2)
        );
        assert_eq!(
            parse_str("a{2,3}", &["a"]).unwrap(),
            Node::RepeatBetween(Box::new(lit("a")), 2, 3)
        );
        assert_eq!(
            parse_str("a{2,}", &["a"]).unwrap(),
            Node::RepeatMin(Box::new(lit("a")), 2)
        );
    }

    #[test]
    fn quantifier_binds_before_star() {
        assert_eq!(
            parse_str("x{2}*", &["x"]).unwrap(),
            Node::star(Node::RepeatExactly(Box::new(lit("x")), 2))
        );
    }

    #[test]
    fn nested_groups_with_quantifiers() {
        let node = parse_str("a+(b*){2,3}c+d", &["a", "b", "c", "d"]).unwrap();
        assert_eq!(
            node,
            Node::or(
                lit("a"),
                Node::or(
                    Node::seq(
                        Node::RepeatBetween(Box::new(Node::star(lit("b"))), 2, 3),
                        lit("c")
                    ),
                    lit("d")
                )
            )
        );
    }

    #[test]
    fn epsilon_literal() {
        let node = parse_str("ε", &["a"]).unwrap();
        assert!(node.is_epsilon());
    }

    #[test]
    fn rejects_unclosed_group() {
        assert!(parse_str("(ab", &["a", "b"]).unwrap_err().is_syntax());
    }

    #[test]
    fn rejects_trailing_tokens() {
        assert!(parse_str("a)", &["a"]).unwrap_err().is_syntax());
    }

    #[test]
    fn rejects_dangling_operators() {
        assert!(parse_str("a+", &["a"]).unwrap_err().is_syntax());
        assert!(parse_str("*a", &["a"]).unwrap_err().is_syntax());
        assert!(parse_str("", &["a"]).unwrap_err().is_syntax());
        assert!(parse_str("{2}", &["a"]).unwrap_err().is_syntax());
    }

    #[test]
    fn rejects_malformed_token_streams() {
        let tokens = vec![
            Token::new(TokenKind::Literal, "a"),
            Token::new(TokenKind::OpenBrace, "{"),
            Token::new(TokenKind::MetaChar, "3"),
            Token::new(TokenKind::Comma, ","),
            Token::new(TokenKind::MetaChar, "1"),
            Token::new(TokenKind::CloseBrace, "}"),
        ];
        assert!(parse(tokens).unwrap_err().is_syntax());

        let tokens = vec![
            Token::new(TokenKind::Literal, "a"),
            Token::new(TokenKind::OpenBrace, "{"),
            Token::new(TokenKind::MetaChar, "3"),
        ];
        assert!(parse(tokens).unwrap_err().is_syntax());
    }

    #[test]
    fn renders_tree() {
        let node = parse_str("a{2,3}*", &["a"]).unwrap();
        assert_eq!(
            node.to_string(),
            "STAR\n  REPEAT_BETWEEN: 2-3\n    LITERAL: a\n"
        );
    }
}
