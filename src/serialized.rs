//! Interchange form of an automaton: one JSON object keyed by state name plus
//! a reserved `startingState` key.
//!
//! ```json
//! {
//!   "startingState": "0",
//!   "0": { "isTerminatingState": false, "a": "1" },
//!   "1": { "isTerminatingState": true }
//! }
//! ```
//!
//! DFAs map each symbol to one successor name, NFAs map each symbol (and
//! `epsilon`) to a list of names.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key used for epsilon transitions in a serialized NFA.
pub const EPSILON_KEY: &str = "epsilon";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedAutomaton<T> {
    #[serde(rename = "startingState")]
    pub starting_state: String,

    #[serde(flatten)]
    pub states: BTreeMap<String, SerializedState<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedState<T> {
    #[serde(rename = "isTerminatingState")]
    pub is_terminating_state: bool,

    #[serde(flatten)]
    pub transitions: BTreeMap<String, T>,
}

impl<T> SerializedState<T> {
    pub fn new(is_terminating_state: bool) -> Self {
        SerializedState {
            is_terminating_state,
            transitions: BTreeMap::new(),
        }
    }
}

pub type SerializedNfa = SerializedAutomaton<Vec<String>>;

pub type SerializedDfa = SerializedAutomaton<String>;

impl<T: Serialize> SerializedAutomaton<T> {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidAutomaton(e.to_string()))
    }
}

impl<T: for<'de> Deserialize<'de>> SerializedAutomaton<T> {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidAutomaton(e.to_string()))
    }
}

impl<T> SerializedAutomaton<T> {
    pub fn state(&self, name: &str) -> Option<&SerializedState<T>> {
        self.states.get(name)
    }
}

/// Hands out small sequential numbers to state ids in the order they are
/// first seen. Each serialization pass owns its own numbering.
#[derive(Debug, Default)]
pub struct StateNumbering {
    numbers: HashMap<usize, usize>,
}

impl StateNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(&mut self, id: usize) -> usize {
        let next = self.numbers.len();
        *self.numbers.entry(id).or_insert(next)
    }

    pub fn name(&mut self, id: usize) -> String {
        self.number(id).to_string()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_is_first_seen_order() {
        let mut numbering = StateNumbering::new();
        assert_eq!(numbering.name(7), "0");
        assert_eq!(numbering.name(3), "1");
        assert_eq!(numbering.name(7), "0");
        assert_eq!(numbering.name(0), "2");
        assert_eq!(numbering.len(), 3);
    }

    #[test]
    fn dfa_json_layout() {
        let mut states = BTreeMap::new();
        let mut zero = SerializedState::new(false);
        zero.transitions.insert("a".to_owned(), "1".to_owned());
        states.insert("0".to_owned(), zero);
        states.insert("1".to_owned(), SerializedState::new(true));
        let dfa = SerializedDfa {
            starting_state: "0".to_owned(),
            states,
        };

        let value: serde_json::Value = serde_json::from_str(&dfa.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "startingState": "0",
                "0": { "isTerminatingState": false, "a": "1" },
                "1": { "isTerminatingState": true }
            })
        );

        let parsed = SerializedDfa::from_json(&dfa.to_json().unwrap()).unwrap();
        assert_eq!(parsed, dfa);
    }

    #[test]
    fn nfa_json_layout() {
        let json = r#"{
            "startingState": "0",
            "0": { "isTerminatingState": false, "epsilon": ["2", "3"] },
            "1": { "isTerminatingState": true }
        }"#;
        let nfa = SerializedNfa::from_json(json).unwrap();
        assert_eq!(nfa.starting_state, "0");
        assert_eq!(
            nfa.state("0").unwrap().transitions[EPSILON_KEY],
            vec!["2".to_owned(), "3".to_owned()]
        );
        assert!(nfa.state("1").unwrap().is_terminating_state);
    }

    #[test]
    fn rejects_missing_start() {
        let json = r#"{ "0": { "isTerminatingState": true } }"#;
        assert!(SerializedDfa::from_json(json).is_err());
    }
}
