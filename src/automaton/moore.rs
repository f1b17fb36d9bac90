use std::collections::VecDeque;

use crate::{alphabet::InputAlphabet, math, rows::FormatError};

use super::{ensure_unique_states, StateIndex, StateSet, TransitionTable};

/// A Moore machine is a transition system where each state has an output. Running a Moore
/// machine on a word produces the outputs of the states that are entered, one for each
/// transition that is taken, which is the same observation a [`super::MealyMachine`] gives.
///
/// A Moore machine may be nondeterministic: every transition leads to a [`StateSet`], which
/// can be empty (no transition) or contain several states. Such machines are the input of
/// the subset construction, most other operations require a deterministic machine and
/// check this through [`MooreMachine::successors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MooreMachine {
    pub(crate) outputs: Vec<String>,
    pub(crate) states: Vec<String>,
    pub(crate) alphabet: InputAlphabet,
    pub(crate) transitions: TransitionTable<StateSet>,
}

impl MooreMachine {
    /// Creates a new Moore machine and checks that it is well formed: there must be at
    /// least two states with distinct names, exactly one output per state, one transition
    /// row per input signal and one target per state in each row, and all targets must
    /// consist of existing states.
    pub fn try_new(
        outputs: Vec<String>,
        states: Vec<String>,
        alphabet: InputAlphabet,
        transitions: TransitionTable<StateSet>,
    ) -> Result<Self, FormatError> {
        if states.len() < 2 {
            return Err(FormatError::TooFewStates(states.len()));
        }
        if outputs.len() != states.len() {
            return Err(FormatError::OutputCountMismatch {
                expected: states.len(),
                found: outputs.len(),
            });
        }
        ensure_unique_states(&states)?;
        transitions.validate(states.len(), &alphabet)?;
        Ok(Self {
            outputs,
            states,
            alphabet,
            transitions,
        })
    }

    /// Returns the labels of the states, the position of a label is the index of the state.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Returns the outputs of the states, aligned with [`Self::states`].
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Returns the output of `state`.
    pub fn output(&self, state: StateIndex) -> Option<&str> {
        self.outputs.get(state).map(|o| o.as_str())
    }

    /// Gives a reference to the input alphabet.
    pub fn alphabet(&self) -> &InputAlphabet {
        &self.alphabet
    }

    /// Gives a reference to the transition table.
    pub fn transitions(&self) -> &TransitionTable<StateSet> {
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

    /// Returns the set of states reached when reading `signal` in `state`.
    pub fn transition(&self, state: StateIndex, signal: &str) -> Option<&StateSet> {
        self.transitions
            .target(self.alphabet.position(signal)?, state)
    }

    /// Returns true if every transition leads to exactly one state.
    pub fn is_deterministic(&self) -> bool {
        self.transitions
            .rows()
            .iter()
            .all(|row| row.iter().all(|target| target.single().is_some()))
    }

    /// Resolves every transition to its unique successor. The result has one row per input
    /// signal and one entry per state. Fails with [`FormatError::Nondeterministic`] for the
    /// first transition that leads to no or to several states.
    pub fn successors(&self) -> Result<Vec<Vec<StateIndex>>, FormatError> {
        self.transitions
            .rows()
            .iter()
            .zip(self.alphabet.iter())
            .map(|(row, signal)| {
                row.iter()
                    .enumerate()
                    .map(|(state, target)| {
                        target.single().ok_or_else(|| FormatError::Nondeterministic {
                            state: self.states[state].clone(),
                            signal: signal.to_string(),
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Runs `word` from the initial state and collects the outputs of the states that are
    /// entered. Returns `None` if the word contains an unknown signal or if a transition
    /// that is taken does not lead to exactly one state.
    pub fn run<I, S>(&self, word: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = 0;
        let mut outputs = vec![];
        for signal in word {
            state = self.transition(state, signal.as_ref())?.single()?;
            outputs.push(self.output(state)?.to_string());
        }
        Some(outputs)
    }

    /// Returns true if `self` is bisimilar to `other`, i.e. if the two machines produce the
    /// same outputs for each finite word. This is done by checking whether
    /// [`Self::witness_non_bisimilarity`] returns `None`.
    pub fn bisimilar(&self, other: &MooreMachine) -> bool {
        self.witness_non_bisimilarity(other).is_none()
    }

    /// Returns a shortest word on which [`Self::run`] gives different results for `self`
    /// and `other`, or `None` if there is no such word. As the empty word produces no
    /// output, the outputs of the two initial states are not compared.
    pub fn witness_non_bisimilarity(&self, other: &MooreMachine) -> Option<Vec<String>> {
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
                let left = self.transition(p, signal).and_then(StateSet::single);
                let right = other.transition(q, signal).and_then(StateSet::single);
                let (Some(left), Some(right)) = (left, right) else {
                    if left.is_some() || right.is_some() {
                        return Some(extended);
                    }
                    continue;
                };
                if self.output(left) != other.output(right) {
                    return Some(extended);
                }
                if seen.insert((left, right)) {
                    queue.push_back((left, right, extended));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn moore_runs_and_bisimilarity() {
        let left = MooreMachine::try_from_str(
            ";0;1;1
            ;A;B;C
            a;B;C;A
            b;A;A;A",
        )
        .unwrap();
        let right = MooreMachine::try_from_str(
            ";0;1
            ;X;Y
            a;Y;Y
            b;X;X",
        )
        .unwrap();
        assert!(left.is_deterministic());
        assert_eq!(
            left.run(["a", "a", "a", "b"]),
            Some(vec!["1".into(), "1".into(), "0".into(), "0".into()])
        );
        assert_eq!(
            left.witness_non_bisimilarity(&right),
            Some(vec!["a".to_string(), "a".to_string(), "a".to_string()])
        );
        assert!(left.bisimilar(&left.clone()));
    }

    #[test]
    fn nondeterminism_is_detected() {
        let nfa = MooreMachine::try_from_str(
            ";;F
            ;A;B
            a;A,B;
            b;B;A",
        )
        .unwrap();
        assert!(!nfa.is_deterministic());
        assert_eq!(
            nfa.successors(),
            Err(FormatError::Nondeterministic {
                state: "A".into(),
                signal: "a".into()
            })
        );
        assert_eq!(nfa.run(["b", "a"]), None);
        assert_eq!(nfa.run(["b"]), Some(vec!["F".to_string()]));
    }
}
