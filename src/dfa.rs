use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::nfa::{Nfa, StateId, StateSet};
use crate::serialized::{SerializedDfa, SerializedState};

/// Deterministic automaton over a set of string symbols.
///
/// States are `0..len()`. A missing transition for a symbol of the alphabet
/// leads to an implicit dead state; automata straight out of subset
/// construction are total, minimized ones leave those transitions out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub alphabet: BTreeSet<String>,
    pub transitions: Vec<BTreeMap<String, StateId>>,
    pub start: StateId,
    pub accepting: BTreeSet<StateId>,
}

impl Dfa {
    /// Subset construction. DFA states are numbered in the order their NFA
    /// subsets are first discovered, so the start state is always `0`.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let alphabet = nfa.alphabet();

        let mut subsets: Vec<StateSet> = Vec::new();
        let mut subset_to_id: HashMap<StateSet, StateId> = HashMap::new();
        let mut transitions: Vec<BTreeMap<String, StateId>> = Vec::new();
        let mut accepting = BTreeSet::new();

        let initial = nfa.epsilon_closure(&StateSet::single(nfa.start));
        subset_to_id.insert(initial.clone(), 0);
        subsets.push(initial);
        transitions.push(BTreeMap::new());

        let mut queue = VecDeque::new();
        queue.push_back(0);

        while let Some(current) = queue.pop_front() {
            if subsets[current].contains(&nfa.end) {
                accepting.insert(current);
            }

            for symbol in alphabet.iter() {
                let next = nfa.epsilon_closure(&nfa.move_on(&subsets[current], symbol));

                let next_id = match subset_to_id.get(&next) {
                    Some(id) => *id,
                    None => {
                        let id = subsets.len();
                        trace!("discovered state {} = {:?}", id, next.0);
                        subset_to_id.insert(next.clone(), id);
                        subsets.push(next);
                        transitions.push(BTreeMap::new());
                        queue.push_back(id);
                        id
                    }
                };

                transitions[current].insert(symbol.clone(), next_id);
            }
        }

        debug!(
            "subset construction: {} NFA states -> {} DFA states",
            nfa.len(),
            subsets.len()
        );

        Dfa {
            alphabet,
            transitions,
            start: 0,
            accepting,
        }
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    /// Target of `state` on `symbol`, or `None` for the implicit dead state.
    pub fn next(&self, state: StateId, symbol: &str) -> Option<StateId> {
        self.transitions
            .get(state)
            .and_then(|t| t.get(symbol))
            .cloned()
    }

    /// Splits `input` into alphabet symbols using longest-match.
    pub fn split_input<'a>(&self, input: &'a str) -> Result<Vec<&'a str>> {
        let mut symbols = Vec::new();
        let mut rest = input;
        while !rest.is_empty() {
            let symbol = self
                .alphabet
                .iter()
                .filter(|s| rest.starts_with(s.as_str()))
                .max_by_key(|s| s.len());

            match symbol {
                Some(symbol) => {
                    let (head, tail) = rest.split_at(symbol.len());
                    symbols.push(head);
                    rest = tail;
                }
                None => {
                    return Err(Error::Usage(format!(
                        "input {:?} has no alphabet symbol at byte {}",
                        input,
                        input.len() - rest.len()
                    )))
                }
            }
        }
        Ok(symbols)
    }

    /// Replays the automaton over `input`, split into symbols by longest
    /// match against the alphabet.
    pub fn execute(&self, input: &str) -> Result<bool> {
        let symbols = self.split_input(input)?;
        self.execute_symbols(&symbols)
    }

    /// Replays the automaton over an already split symbol sequence.
    pub fn execute_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<bool> {
        let mut state = self.start;
        for symbol in symbols {
            let symbol = symbol.as_ref();
            if !self.alphabet.contains(symbol) {
                return Err(Error::Usage(format!(
                    "symbol {:?} is not in the automaton alphabet",
                    symbol
                )));
            }

            state = match self.next(state, symbol) {
                Some(next) => next,
                None => return Ok(false),
            };
        }

        Ok(self.is_accepting(state))
    }

    /// States reachable from the start state, in breadth first order.
    pub fn reachable(&self) -> Vec<StateId> {
        let mut seen = vec![false; self.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        seen[self.start] = true;
        queue.push_back(self.start);
        while let Some(state) = queue.pop_front() {
            order.push(state);
            for next in self.transitions[state].values() {
                if !seen[*next] {
                    seen[*next] = true;
                    queue.push_back(*next);
                }
            }
        }
        order
    }

    /// For each state, whether some accepting state can be reached from it.
    pub fn live(&self) -> Vec<bool> {
        let mut predecessors = vec![Vec::new(); self.len()];
        for (from, row) in self.transitions.iter().enumerate() {
            for to in row.values() {
                predecessors[*to].push(from);
            }
        }

        let mut live = vec![false; self.len()];
        let mut stack: Vec<StateId> = self.accepting.iter().cloned().collect();
        for state in stack.iter() {
            live[*state] = true;
        }
        while let Some(state) = stack.pop() {
            for from in predecessors[state].iter() {
                if !live[*from] {
                    live[*from] = true;
                    stack.push(*from);
                }
            }
        }
        live
    }

    pub fn to_serialized(&self) -> SerializedDfa {
        let mut states = BTreeMap::new();
        for (id, transitions) in self.transitions.iter().enumerate() {
            let mut entry = SerializedState::new(self.is_accepting(id));
            for (symbol, next) in transitions.iter() {
                entry.transitions.insert(symbol.clone(), next.to_string());
            }
            states.insert(id.to_string(), entry);
        }

        SerializedDfa {
            starting_state: self.start.to_string(),
            states,
        }
    }

    /// Rebuilds an automaton from its interchange form. State names need not
    /// be numeric; they are renumbered in sorted name order. The alphabet is
    /// every symbol that appears on some transition.
    pub fn from_serialized(serialized: &SerializedDfa) -> Result<Self> {
        let ids: HashMap<&str, StateId> = serialized
            .states
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let lookup = |name: &str| -> Result<StateId> {
            ids.get(name).cloned().ok_or_else(|| {
                Error::InvalidAutomaton(format!("reference to undefined state {:?}", name))
            })
        };

        let start = lookup(serialized.starting_state.as_str())?;

        let mut alphabet = BTreeSet::new();
        let mut accepting = BTreeSet::new();
        let mut transitions = Vec::with_capacity(serialized.states.len());
        for (id, state) in serialized.states.values().enumerate() {
            if state.is_terminating_state {
                accepting.insert(id);
            }

            let mut row = BTreeMap::new();
            for (symbol, next) in state.transitions.iter() {
                alphabet.insert(symbol.clone());
                row.insert(symbol.clone(), lookup(next.as_str())?);
            }
            transitions.push(row);
        }

        Ok(Dfa {
            alphabet,
            transitions,
            start,
            accepting,
        })
    }
}
