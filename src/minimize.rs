use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};

use crate::dfa::Dfa;
use crate::nfa::StateId;

/// Disjoint classes of DFA states that no input seen so far can tell apart.
/// Refinement only ever splits classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    classes: Vec<Vec<StateId>>,
    /// Class index per DFA state; `None` for states outside the partition.
    class_of: Vec<Option<usize>>,
}

impl Partition {
    /// Accepting states first, then rejecting ones. Empty classes are left out.
    pub fn initial(dfa: &Dfa, states: &[StateId]) -> Self {
        let (accepting, rejecting): (Vec<StateId>, Vec<StateId>) =
            states.iter().cloned().partition(|s| dfa.is_accepting(*s));

        let classes = vec![accepting, rejecting]
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();

        Self::from_classes(dfa.len(), classes)
    }

    fn from_classes(num_states: usize, classes: Vec<Vec<StateId>>) -> Self {
        let mut class_of = vec![None; num_states];
        for (i, class) in classes.iter().enumerate() {
            for state in class.iter() {
                class_of[*state] = Some(i);
            }
        }

        Partition { classes, class_of }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[Vec<StateId>] {
        &self.classes
    }

    pub fn class_of(&self, state: StateId) -> Option<usize> {
        self.class_of.get(state).cloned().flatten()
    }

    /// Class reached from `state` on each alphabet symbol. `None` is the dead
    /// class: a missing transition or a state outside the partition.
    fn signature(&self, dfa: &Dfa, state: StateId) -> Vec<Option<usize>> {
        dfa.alphabet
            .iter()
            .map(|symbol| dfa.next(state, symbol).and_then(|t| self.class_of(t)))
            .collect()
    }

    /// Splits every class by the signature of its members. Classes keep their
    /// relative order and split parts appear in order of first member.
    pub fn refine(&self, dfa: &Dfa) -> Self {
        let mut classes = Vec::with_capacity(self.classes.len());
        for class in self.classes.iter() {
            let mut groups: Vec<Vec<StateId>> = Vec::new();
            let mut group_of: HashMap<Vec<Option<usize>>, usize> = HashMap::new();

            for state in class.iter() {
                let signature = self.signature(dfa, *state);
                let next = groups.len();
                let i = *group_of.entry(signature).or_insert(next);
                if i == groups.len() {
                    groups.push(Vec::new());
                }
                groups[i].push(*state);
            }

            classes.extend(groups);
        }

        Self::from_classes(dfa.len(), classes)
    }

    /// Refines until no class splits any more.
    pub fn coarsest(dfa: &Dfa, states: &[StateId]) -> Self {
        let mut partition = Self::initial(dfa, states);
        let mut round = 0;
        loop {
            let next = partition.refine(dfa);
            round += 1;
            trace!("refinement round {}: {} classes", round, next.len());
            if next.len() == partition.len() {
                return next;
            }
            partition = next;
        }
    }
}

/// Produces the smallest DFA accepting the same language.
///
/// Only states that are reachable and can still reach an accepting state take
/// part. Transitions into any other state are left out of the result, so the
/// dead class never appears in it.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let live = dfa.live();
    let states: Vec<StateId> = dfa
        .reachable()
        .into_iter()
        .filter(|s| live[*s])
        .collect();

    let partition = Partition::coarsest(dfa, &states);

    let start = match partition.class_of(dfa.start) {
        Some(class) => class,
        None => {
            debug!("minimized {} states to an automaton accepting nothing", dfa.len());
            return Dfa {
                alphabet: dfa.alphabet.clone(),
                transitions: vec![BTreeMap::new()],
                start: 0,
                accepting: BTreeSet::new(),
            };
        }
    };

    let mut transitions = Vec::with_capacity(partition.len());
    let mut accepting = BTreeSet::new();
    for (id, class) in partition.classes().iter().enumerate() {
        // Members of a class behave identically, so any one speaks for all.
        let representative = class[0];
        if dfa.is_accepting(representative) {
            accepting.insert(id);
        }

        let mut row = BTreeMap::new();
        for (symbol, target) in dfa.transitions[representative].iter() {
            if let Some(target_class) = partition.class_of(*target) {
                row.insert(symbol.clone(), target_class);
            }
        }
        transitions.push(row);
    }

    debug!(
        "minimized {} states ({} live) to {}",
        dfa.len(),
        states.len(),
        transitions.len()
    );

    Dfa {
        alphabet: dfa.alphabet.clone(),
        transitions,
        start,
        accepting,
    }
}

impl Dfa {
    pub fn minimize(&self) -> Dfa {
        minimize(self)
    }
}
