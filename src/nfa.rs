use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};

use log::debug;

use crate::lexer::EPSILON;
use crate::parser::Node;
use crate::serialized::{SerializedNfa, SerializedState, StateNumbering, EPSILON_KEY};

/// Index of a state in an automaton's state arena.
pub type StateId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Epsilon,
    Input(String),
}

impl Label {
    pub fn for_symbol(symbol: &str) -> Self {
        if symbol == EPSILON {
            Label::Epsilon
        } else {
            Label::Input(symbol.to_owned())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct State {
    pub transitions: BTreeMap<Label, StateSet>,
}

/// Thompson NFA with a single start and a single end state. The end state
/// never has outgoing transitions.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<State>,
    pub start: StateId,
    pub end: StateId,
}

/// Entry and exit of a partially built automaton.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Arena that allocates fresh states while walking the syntax tree. Every
/// compilation owns its own builder, so ids are never shared between them.
#[derive(Debug, Default)]
pub struct NfaBuilder {
    states: Vec<State>,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, root: &Node) -> Nfa {
        let fragment = self.construct(root);
        debug!("built NFA with {} states", self.states.len());
        Nfa {
            states: self.states,
            start: fragment.start,
            end: fragment.end,
        }
    }

    fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        self.states[from]
            .transitions
            .entry(label)
            .or_insert_with(StateSet::new)
            .insert(to);
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, Label::Epsilon, to);
    }

    /// Two states joined only by epsilon.
    fn bypass(&mut self) -> Fragment {
        let start = self.add_state();
        let end = self.add_state();
        self.add_epsilon(start, end);
        Fragment { start, end }
    }

    fn construct(&mut self, node: &Node) -> Fragment {
        match node {
            Node::Literal(symbol) => {
                let start = self.add_state();
                let end = self.add_state();
                self.add_transition(start, Label::for_symbol(symbol), end);
                Fragment { start, end }
            }
            Node::Seq(left, right) => {
                let l = self.construct(left);
                let r = self.construct(right);
                self.add_epsilon(l.end, r.start);
                Fragment {
                    start: l.start,
                    end: r.end,
                }
            }
            Node::Or(left, right) => {
                let start = self.add_state();
                let l = self.construct(left);
                let r = self.construct(right);
                let end = self.add_state();
                self.add_epsilon(start, l.start);
                self.add_epsilon(start, r.start);
                self.add_epsilon(l.end, end);
                self.add_epsilon(r.end, end);
                Fragment { start, end }
            }
            Node::Star(sub) => self.star(sub),
            Node::RepeatExactly(sub, n) => {
                if *n == 0 {
                    return self.bypass();
                }

                let first = self.construct(sub);
                let mut end = first.end;
                for _ in 1..*n {
                    let copy = self.construct(sub);
                    self.add_epsilon(end, copy.start);
                    end = copy.end;
                }

                Fragment {
                    start: first.start,
                    end,
                }
            }
            Node::RepeatBetween(sub, low, high) => {
                let start = self.add_state();
                let end = self.add_state();

                // `junction` is where the i-th copy is entered, i.e. after i copies.
                let mut junction = start;
                for i in 0..*high {
                    let copy = self.construct(sub);
                    if i >= *low {
                        self.add_epsilon(junction, end);
                    }
                    self.add_epsilon(junction, copy.start);
                    junction = copy.end;
                }
                self.add_epsilon(junction, end);

                Fragment { start, end }
            }
            Node::RepeatMin(sub, min) => {
                if *min == 0 {
                    return self.star(sub);
                }

                let first = self.construct(sub);
                let mut last = first;
                for _ in 1..*min {
                    let copy = self.construct(sub);
                    self.add_epsilon(last.end, copy.start);
                    last = copy;
                }

                let end = self.add_state();
                self.add_epsilon(last.end, last.start);
                self.add_epsilon(last.end, end);

                Fragment {
                    start: first.start,
                    end,
                }
            }
        }
    }

    fn star(&mut self, sub: &Node) -> Fragment {
        let start = self.add_state();
        let inner = self.construct(sub);
        let end = self.add_state();
        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, end);
        self.add_epsilon(inner.end, start);
        self.add_epsilon(inner.end, end);
        Fragment { start, end }
    }
}

impl Nfa {
    /// Compiles a syntax tree with Thompson's construction.
    pub fn from_ast(root: &Node) -> Nfa {
        NfaBuilder::new().build(root)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every symbol used on some transition, excluding epsilon.
    pub fn alphabet(&self) -> BTreeSet<String> {
        let mut alphabet = BTreeSet::new();
        for state in self.states.iter() {
            for label in state.transitions.keys() {
                if let Label::Input(symbol) = label {
                    alphabet.insert(symbol.clone());
                }
            }
        }
        alphabet
    }

    /// Smallest superset of `state_set` closed under epsilon transitions.
    pub fn epsilon_closure(&self, state_set: &StateSet) -> StateSet {
        let mut closure = state_set.clone();
        let mut queue = state_set.iter().cloned().collect::<VecDeque<_>>();
        while let Some(state_id) = queue.pop_front() {
            if let Some(next) = self.states[state_id].transitions.get(&Label::Epsilon) {
                for next_state_id in next.iter() {
                    if closure.insert(*next_state_id) {
                        queue.push_back(*next_state_id);
                    }
                }
            }
        }
        closure
    }

    /// States reachable from `state_set` by exactly one transition on `symbol`.
    pub fn move_on(&self, state_set: &StateSet, symbol: &str) -> StateSet {
        let label = Label::Input(symbol.to_owned());
        let mut reachable = StateSet::new();
        for id in state_set.iter() {
            if let Some(next) = self.states[*id].transitions.get(&label) {
                reachable.extend(next.iter().cloned());
            }
        }
        reachable
    }

    /// Simulates the automaton directly on a sequence of symbols.
    pub fn accepts<S: AsRef<str>>(&self, symbols: &[S]) -> bool {
        let mut current = self.epsilon_closure(&StateSet::single(self.start));
        for symbol in symbols {
            if current.is_empty() {
                return false;
            }
            current = self.epsilon_closure(&self.move_on(&current, symbol.as_ref()));
        }
        current.contains(&self.end)
    }

    /// Renders the interchange form. The start state is named `0`, the end
    /// state `1`, and the rest follow in breadth first discovery order.
    pub fn to_serialized(&self) -> SerializedNfa {
        let mut numbering = StateNumbering::new();
        let starting_state = numbering.name(self.start);
        numbering.number(self.end);

        let mut states = BTreeMap::new();
        let mut visited = StateSet::single(self.start);
        let mut queue = VecDeque::new();
        queue.push_back(self.start);

        while let Some(id) = queue.pop_front() {
            let mut entry = SerializedState::new(id == self.end);
            for (label, targets) in self.states[id].transitions.iter() {
                let key = match label {
                    Label::Epsilon => EPSILON_KEY.to_owned(),
                    Label::Input(symbol) => symbol.clone(),
                };
                let names: Vec<String> = targets.iter().map(|t| numbering.name(*t)).collect();
                entry.transitions.insert(key, names);

                for t in targets.iter() {
                    if visited.insert(*t) {
                        queue.push_back(*t);
                    }
                }
            }
            states.insert(numbering.name(id), entry);
        }

        SerializedNfa {
            starting_state,
            states,
        }
    }
}

/// Set of NFA states. Ordered, so equal sets hash and compare equal and a
/// subset can serve as a map key during subset construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSet(pub BTreeSet<StateId>);

impl Deref for StateSet {
    type Target = BTreeSet<StateId>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for StateSet {
    fn deref_mut(&mut self) -> &mut BTreeSet<StateId> {
        &mut self.0
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        StateSet(iter.into_iter().collect())
    }
}

impl StateSet {
    pub fn new() -> StateSet {
        StateSet(BTreeSet::new())
    }

    pub fn single(id: StateId) -> StateSet {
        let mut set = StateSet::new();
        set.insert(id);
        set
    }
}
