use std::str::FromStr;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    automaton::{
        Automaton, AutomatonKind, MealyMachine, MealyTarget, MooreMachine, StateSet,
        TransitionTable,
    },
    math,
    rows::FormatError,
};

/// Decides which state of a Moore machine that is converted from a Mealy machine becomes
/// the initial state `S0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InitialState {
    /// States are numbered strictly in the order in which their targets are discovered, so
    /// `S0` stands for the first target of the first signal. The initial state of the Mealy
    /// machine is not taken into account, hence the result may behave differently.
    #[default]
    Discovery,
    /// The first discovered target that leads to the initial state of the Mealy machine
    /// becomes `S0`, all other states keep their relative order. If no transition leads to
    /// the initial state, an additional state with an empty output that behaves like it is
    /// put in front. The result produces the same outputs as the Mealy machine.
    Preserve,
}

impl FromStr for InitialState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(InitialState::Discovery),
            "preserve" => Ok(InitialState::Preserve),
            other => Err(format!("unknown initial state rule `{other}`")),
        }
    }
}

/// Configures the conversion of a Mealy machine into a Moore machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConversionOptions {
    /// Which of the new states becomes the initial state.
    pub initial: InitialState,
}

impl ConversionOptions {
    /// Creates options that use the given [`InitialState`] rule.
    pub fn with_initial(initial: InitialState) -> Self {
        Self { initial }
    }
}

/// Computes the order of the new states when the initial state is preserved. Returns the
/// position of every discovered target among the new states, together with the targets
/// in their new order.
fn preserving_initial(pairs: &math::IndexedSet<MealyTarget>) -> (Vec<usize>, Vec<MealyTarget>) {
    match pairs.iter().position(|t| t.next() == 0) {
        Some(initial) => {
            let rank = (0..pairs.len())
                .map(|i| match i {
                    i if i == initial => 0,
                    i if i < initial => i + 1,
                    i => i,
                })
                .collect();
            let order = std::iter::once(initial)
                .chain((0..pairs.len()).filter(|i| *i != initial))
                .filter_map(|i| pairs.get_index(i).cloned())
                .collect();
            (rank, order)
        }
        None => {
            trace!("initial state is never entered, adding a fresh initial state");
            let rank = (1..=pairs.len()).collect();
            let order = std::iter::once(MealyTarget::new(0, ""))
                .chain(pairs.iter().cloned())
                .collect();
            (rank, order)
        }
    }
}

impl MealyMachine {
    /// Converts the Mealy machine into a Moore machine.
    ///
    /// Every distinct target `next/output` that occurs in the transition table becomes one
    /// state of the Moore machine, which carries `output` and behaves like `next`. Targets
    /// are discovered signal by signal and, within a signal, from the first to the last
    /// state, and the resulting states are named `S0`, `S1`, ... in that order. The
    /// `initial` rule of the `options` may move one of them to the front, see
    /// [`InitialState`].
    pub fn to_moore(&self, options: &ConversionOptions) -> MooreMachine {
        let mut pairs: math::IndexedSet<MealyTarget> = math::IndexedSet::default();
        let ids = self.transitions.map(|t| pairs.insert_full(t.clone()).0);
        trace!("discovered {} distinct targets", pairs.len());

        // rank[i] is the position of the i-th discovered target among the new states
        let (rank, order): (Vec<usize>, Vec<MealyTarget>) = match options.initial {
            InitialState::Discovery => {
                ((0..pairs.len()).collect(), pairs.iter().cloned().collect())
            }
            InitialState::Preserve => preserving_initial(&pairs),
        };

        let outputs = order.iter().map(|t| t.output().to_string()).collect();
        let states = (0..order.len()).map(|i| format!("S{i}")).collect();
        let transitions = TransitionTable::from_rows(
            ids.rows()
                .iter()
                .map(|row| {
                    order
                        .iter()
                        .map(|t| StateSet::singleton(rank[row[t.next()]]))
                        .collect()
                })
                .collect(),
        );

        let moore = MooreMachine {
            outputs,
            states,
            alphabet: self.alphabet.clone(),
            transitions,
        };
        debug!(
            "converted mealy machine with {} states into moore machine with {} states",
            self.size(),
            moore.size()
        );
        moore
    }
}

impl MooreMachine {
    /// Converts the Moore machine into a Mealy machine with the same states. A transition
    /// to `next` becomes a transition to `next` that emits the output of `next`.
    ///
    /// Fails with [`FormatError::Nondeterministic`] if some transition does not lead to
    /// exactly one state.
    pub fn to_mealy(&self) -> Result<MealyMachine, FormatError> {
        let successors = self.successors()?;
        let transitions = TransitionTable::from_rows(
            successors
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|next| MealyTarget::new(next, self.outputs[next].clone()))
                        .collect_vec()
                })
                .collect(),
        );
        debug!("converted moore machine with {} states into mealy machine", self.size());
        Ok(MealyMachine {
            states: self.states.clone(),
            alphabet: self.alphabet.clone(),
            transitions,
        })
    }
}

impl Automaton {
    /// Converts the machine into a machine of the given `kind`. If the machine already is of
    /// that kind, it is returned unchanged.
    pub fn convert(
        self,
        kind: AutomatonKind,
        options: &ConversionOptions,
    ) -> Result<Automaton, FormatError> {
        Ok(match (self, kind) {
            (Automaton::Mealy(mm), AutomatonKind::Moore) => {
                Automaton::Moore(mm.to_moore(options))
            }
            (Automaton::Moore(mm), AutomatonKind::Mealy) => Automaton::Mealy(mm.to_mealy()?),
            (unchanged, _) => unchanged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversionOptions, InitialState};
    use crate::prelude::*;

    fn preserve() -> ConversionOptions {
        ConversionOptions::with_initial(InitialState::Preserve)
    }

    #[test_log::test]
    fn mealy_to_moore_two_states() {
        let mealy = MealyMachine::try_from_str(
            ";A;B
            x;A/0;B/1",
        )
        .unwrap();
        for options in [ConversionOptions::default(), preserve()] {
            let moore = mealy.to_moore(&options);
            assert_eq!(moore.size(), 2);
            assert_eq!(moore.outputs(), &["0".to_string(), "1".to_string()]);
            assert_eq!(moore.to_rows(), vec![";0;1", ";S0;S1", "x;S0;S1"]);
            assert!(mealy.bisimilar(&moore.to_mealy().unwrap()));
        }
    }

    #[test_log::test]
    fn states_are_numbered_in_discovery_order() {
        let mealy = MealyMachine::try_from_str(
            ";A;B
            x;B/0;A/1",
        )
        .unwrap();
        // S0 stands for B/0, the first discovered target
        assert_eq!(
            mealy.to_moore(&ConversionOptions::default()).to_rows(),
            vec![";0;1", ";S0;S1", "x;S1;S0"]
        );
        assert_eq!(
            mealy.to_moore(&preserve()).to_rows(),
            vec![";1;0", ";S0;S1", "x;S1;S0"]
        );

        let mealy = MealyMachine::try_from_str(
            ";A;B
            x;B/0;B/1",
        )
        .unwrap();
        assert_eq!(
            mealy.to_moore(&ConversionOptions::default()).to_rows(),
            vec![";0;1", ";S0;S1", "x;S1;S1"]
        );
    }

    #[test_log::test]
    fn initial_state_becomes_first_moore_state() {
        let mealy = MealyMachine::try_from_str(
            ";A;B;C
            x;B/1;C/0;A/1
            y;C/0;A/0;B/1",
        )
        .unwrap();
        let moore = mealy.to_moore(&preserve());
        // discovered: B/1, C/0, A/1, A/0; A/1 is moved to the front
        assert_eq!(
            moore.to_rows(),
            vec![
                ";1;1;0;0",
                ";S0;S1;S2;S3",
                "x;S1;S2;S0;S1",
                "y;S2;S3;S1;S2",
            ]
        );
        for word in [vec!["x", "x", "y"], vec!["y", "y", "x", "y"], vec![]] {
            assert_eq!(mealy.run(&word), moore.run(&word));
        }
        assert_eq!(mealy.witness_inequivalence(&moore.to_mealy().unwrap()), None);
    }

    #[test_log::test]
    fn unreachable_initial_state_gets_fresh_moore_state() {
        let mealy = MealyMachine::try_from_str(
            ";A;B
            x;B/0;B/1",
        )
        .unwrap();
        let moore = mealy.to_moore(&preserve());
        assert_eq!(moore.to_rows(), vec![";;0;1", ";S0;S1;S2", "x;S1;S2;S2"]);
        assert!(mealy.bisimilar(&moore.to_mealy().unwrap()));
    }

    #[test_log::test]
    fn moore_to_mealy_and_back() {
        let moore = MooreMachine::try_from_str(
            ";u;v;w
            ;A;B;C
            a;B;C;A
            b;A;C;B",
        )
        .unwrap();
        let mealy = moore.to_mealy().unwrap();
        assert_eq!(
            mealy.to_rows(),
            vec![";A;B;C", "a;B/v;C/w;A/u", "b;A/u;C/w;B/v"]
        );
        assert!(moore.bisimilar(&mealy.to_moore(&preserve())));
    }

    #[test]
    fn nondeterministic_moore_is_not_converted() {
        let moore = MooreMachine::try_from_str(
            ";0;1
            ;A;B
            a;A,B;B",
        )
        .unwrap();
        assert!(matches!(
            Automaton::from(moore).convert(AutomatonKind::Mealy, &ConversionOptions::default()),
            Err(FormatError::Nondeterministic { .. })
        ));
    }

    #[test]
    fn identity_conversions() {
        let mealy = Automaton::parse(&[";A;B", "x;B/0;A/1"], AutomatonKind::Mealy).unwrap();
        assert_eq!(
            mealy
                .clone()
                .convert(AutomatonKind::Mealy, &ConversionOptions::default()),
            Ok(mealy)
        );
    }

    #[test]
    fn initial_state_rules_are_parsed() {
        assert_eq!("discovery".parse(), Ok(InitialState::Discovery));
        assert_eq!("preserve".parse(), Ok(InitialState::Preserve));
        assert!("first".parse::<InitialState>().is_err());
    }

    #[cfg(feature = "random")]
    #[test_log::test]
    fn random_round_trips() {
        use crate::random::{generate_random_mealy, generate_random_moore};

        for _ in 0..50 {
            let mealy = generate_random_mealy(6, 3, 3);
            let moore = mealy.to_moore(&preserve());
            assert_eq!(moore.outputs().len(), moore.size());
            assert_eq!(mealy.witness_inequivalence(&moore.to_mealy().unwrap()), None);

            let moore = generate_random_moore(6, 3, 3);
            assert_eq!(
                moore.witness_non_bisimilarity(&moore.to_mealy().unwrap().to_moore(&preserve())),
                None
            );
        }
    }
}
