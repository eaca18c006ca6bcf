//! Compiles regular expressions over multi-character alphabets into minimal
//! DFAs.
//!
//! The pipeline is linear: the regex is tokenized against the alphabet,
//! parsed into a [`Node`] tree, compiled into an [`Nfa`] with Thompson's
//! construction, turned into a [`Dfa`] by subset construction and finally
//! minimized by partition refinement.
//!
//! ```
//! use regdfa::{compile_minimal, Alphabet};
//!
//! let alphabet = Alphabet::new(vec!["a", "b"]);
//! let dfa = compile_minimal("a{2,}b", &alphabet).unwrap();
//! assert!(dfa.execute("aab").unwrap());
//! assert!(!dfa.execute("ab").unwrap());
//! ```
//!
//! Each call owns all of its intermediate state, so independent compilations
//! may run on separate threads.

#[macro_use]
extern crate lazy_static;

pub mod dfa;
pub mod error;
pub mod lexer;
pub mod minimize;
pub mod nfa;
pub mod parser;
pub mod serialized;

pub use dfa::Dfa;
pub use error::{Error, Result};
pub use lexer::{tokenize, Alphabet, Token, TokenKind, EPSILON};
pub use minimize::{minimize, Partition};
pub use nfa::{Nfa, NfaBuilder, StateSet};
pub use parser::{parse, Node, Parser};
pub use serialized::{SerializedAutomaton, SerializedDfa, SerializedNfa, SerializedState};

/// Tokenizes and parses `regex`.
pub fn parse_regex(regex: &str, alphabet: &Alphabet) -> Result<Node> {
    parse(tokenize(regex, alphabet)?)
}

/// Compiles `regex` up to its Thompson NFA.
pub fn compile_nfa(regex: &str, alphabet: &Alphabet) -> Result<Nfa> {
    let ast = parse_regex(regex, alphabet)?;
    Ok(Nfa::from_ast(&ast))
}

/// Compiles `regex` into the (total, non-minimized) subset construction DFA.
pub fn compile(regex: &str, alphabet: &Alphabet) -> Result<Dfa> {
    let nfa = compile_nfa(regex, alphabet)?;
    Ok(Dfa::from_nfa(&nfa))
}

/// Compiles `regex` into its minimal DFA.
pub fn compile_minimal(regex: &str, alphabet: &Alphabet) -> Result<Dfa> {
    Ok(compile(regex, alphabet)?.minimize())
}
