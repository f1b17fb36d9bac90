use std::collections::VecDeque;

use crate::{alphabet::InputAlphabet, math, rows::FormatError};

use super::{ensure_unique_states, MealyTarget, StateIndex, TransitionTable};

/// A Mealy machine is a transition system where each transition has an output. Running a
/// Mealy machine on a word produces a sequence of outputs, one for each transition that is
/// taken. Note that since the empty word does not take any transitions, it does not produce
/// any output. For a word of length `n`, there are `n` outputs.
///
/// The states are kept in a fixed order, the first state is the initial one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealyMachine {
    pub(crate) states: Vec<String>,
    pub(crate) alphabet: InputAlphabet,
    pub(crate) transitions: TransitionTable<MealyTarget>,
}

impl MealyMachine {
    /// Creates a new Mealy machine and checks that it is well formed: there must be at
    /// least two states with distinct names, one transition row per input signal, one
    /// target per state in each row and every target must lead to an existing state.
    pub fn try_new(
        states: Vec<String>,
        alphabet: InputAlphabet,
        transitions: TransitionTable<MealyTarget>,
    ) -> Result<Self, FormatError> {
        if states.len() < 2 {
            return Err(FormatError::TooFewStates(states.len()));
        }
        ensure_unique_states(&states)?;
        transitions.validate(states.len(), &alphabet)?;
        Ok(Self {
            states,
            alphabet,
            transitions,
        })
    }

    /// Returns the labels of the states, the position of a label is the index of the state.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Gives a reference to the input alphabet.
    pub fn alphabet(&self) -> &InputAlphabet {
        &self.alphabet
    }

    /// Gives a reference to the transition table.
    pub fn transitions(&self) -> &TransitionTable<MealyTarget> {
        &self.transitions
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Looks up the index of the state with label `name`.
    pub fn index_of(&self, name: &str) -> Option<StateIndex> {
        self.states.iter().position(|q| q == name)
    }

    /// Returns the target that is taken when reading `signal` in `state`.
    pub fn transition(&self, state: StateIndex, signal: &str) -> Option<&MealyTarget> {
        self.transitions
            .target(self.alphabet.position(signal)?, state)
    }

    /// Runs `word` from the initial state and collects the outputs of all transitions that
    /// are taken. Returns `None` if the word contains a signal that is not in the alphabet.
    pub fn run<I, S>(&self, word: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = 0;
        let mut outputs = vec![];
        for signal in word {
            let target = self.transition(state, signal.as_ref())?;
            outputs.push(target.output().to_string());
            state = target.next();
        }
        Some(outputs)
    }

    /// Returns true if and only if both machines are bisimilar, meaning for all possible
    /// inputs, they will produce the same output.
    pub fn bisimilar(&self, other: &MealyMachine) -> bool {
        self.witness_inequivalence(other).is_none()
    }

    /// Attempts to construct a word that separates the two machines, meaning it produces
    /// different outputs when run in both machines. Signals are matched by their label, a
    /// signal that only one of the machines knows is a witness on its own. If no such word
    /// exists, the function returns `None`.
    ///
    /// The pairs of states that are reachable in the product of both machines are explored
    /// in breadth first order, so the returned witness is as short as possible.
    pub fn witness_inequivalence(&self, other: &MealyMachine) -> Option<Vec<String>> {
        if let Some(signal) = self
            .alphabet
            .iter()
            .chain(other.alphabet.iter())
            .find(|signal| !self.alphabet.contains(signal) || !other.alphabet.contains(signal))
        {
            return Some(vec![signal.to_string()]);
        }

        let mut seen = math::Set::default();
        seen.insert((0, 0));
        let mut queue = VecDeque::from([(0, 0, vec![])]);

        while let Some((p, q, word)) = queue.pop_front() {
            for signal in self.alphabet.iter() {
                let mut extended: Vec<String> = word.clone();
                extended.push(signal.to_string());
                let (Some(left), Some(right)) =
                    (self.transition(p, signal), other.transition(q, signal))
                else {
                    return Some(extended);
                };
                if left.output() != right.output() {
                    return Some(extended);
                }
                if seen.insert((left.next(), right.next())) {
                    queue.push_back((left.next(), right.next(), extended));
                }
            }
        }
        None
    }
}
