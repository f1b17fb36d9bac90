use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::{EPSILON, FINISH},
    automaton::{MooreMachine, StateSet, TransitionTable},
    math,
};

/// Configures the determinization of a Moore machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeterminizationOptions {
    /// The input signal that marks epsilon transitions, which are taken without reading
    /// anything. Defaults to [`EPSILON`].
    pub epsilon: String,
    /// The output that marks accepting states. A macro-state is accepting and carries this
    /// output if it contains an accepting state, all other macro-states have an empty
    /// output. Defaults to [`FINISH`].
    pub finish: String,
}

impl Default for DeterminizationOptions {
    fn default() -> Self {
        Self {
            epsilon: EPSILON.to_string(),
            finish: FINISH.to_string(),
        }
    }
}

impl MooreMachine {
    /// Computes the epsilon closure of every state, i.e. the set of states that can be
    /// reached from it by taking only transitions on the `epsilon` signal, including the
    /// state itself. If the machine has no `epsilon` signal, every closure is a singleton.
    pub fn epsilon_closures(&self, epsilon: &str) -> Vec<StateSet> {
        let Some(row) = self
            .alphabet
            .position(epsilon)
            .and_then(|signal| self.transitions.row(signal))
        else {
            return (0..self.size()).map(StateSet::singleton).collect();
        };

        (0..self.size())
            .map(|q| {
                let mut closure = StateSet::singleton(q);
                let mut queue = VecDeque::from([q]);
                while let Some(p) = queue.pop_front() {
                    for next in row[p].iter() {
                        if closure.insert(next) {
                            queue.push_back(next);
                        }
                    }
                }
                closure
            })
            .collect()
    }

    fn label_of(&self, set: &StateSet) -> String {
        set.iter()
            .map(|q| self.states[q].as_str())
            .sorted()
            .join(",")
    }

    /// Replaces the machine by an equivalent deterministic one, using the subset
    /// construction.
    ///
    /// If the machine has an epsilon signal, the epsilon closure of every state is computed
    /// and the epsilon row is removed. The initial macro-state is the closure of the initial
    /// state. Macro-states are then explored in breadth first order: the successor of a
    /// macro-state on a signal is the union of the closures of all states that its members
    /// lead to. Two macro-states are the same if they contain the same states. The set
    /// without any states is a macro-state as well, it leads to itself on every signal.
    ///
    /// Macro-states are named `S0`, `S1`, ... in the order of their discovery and carry the
    /// finish output if they contain a state with the finish output, and the empty output
    /// otherwise. In the result, every transition leads to exactly one state.
    pub fn determinize(&mut self, options: &DeterminizationOptions) {
        let before = self.size();
        let closures = self.epsilon_closures(&options.epsilon);

        let mut alphabet = self.alphabet.clone();
        let mut table = self.transitions.clone();
        if let Some(position) = alphabet.remove(&options.epsilon) {
            trace!("removing epsilon signal {} at position {position}", options.epsilon);
            table.remove_row(position);
        }

        let mut macro_states: math::IndexedSet<StateSet> = math::IndexedSet::default();
        macro_states.insert(closures[0].clone());
        let mut rows: Vec<Vec<StateSet>> = vec![vec![]; table.signals()];
        let mut current = 0;

        while let Some(macro_state) = macro_states.get_index(current).cloned() {
            trace!("exploring S{current} = {{{}}}", self.label_of(&macro_state));
            for (signal, row) in table.rows().iter().enumerate() {
                let successor: StateSet = macro_state
                    .iter()
                    .flat_map(|q| row[q].iter())
                    .flat_map(|p| closures[p].iter())
                    .collect();
                let (id, discovered) = macro_states.insert_full(successor);
                if discovered {
                    trace!(
                        "discovered S{id} = {{{}}}",
                        self.label_of(&macro_states[id])
                    );
                }
                rows[signal].push(StateSet::singleton(id));
            }
            current += 1;
        }

        self.outputs = macro_states
            .iter()
            .map(|macro_state| {
                if macro_state
                    .iter()
                    .any(|q| self.outputs[q] == options.finish)
                {
                    options.finish.clone()
                } else {
                    String::new()
                }
            })
            .collect();
        self.states = (0..macro_states.len()).map(|i| format!("S{i}")).collect();
        self.alphabet = alphabet;
        self.transitions = TransitionTable::from_rows(rows);
        debug!(
            "determinized moore machine with {before} states into {} macro-states",
            self.size()
        );
    }
}
