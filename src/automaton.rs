use std::fmt::Display;

use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::{alphabet::InputAlphabet, math, rows::FormatError, Show};

mod mealy;
pub use mealy::MealyMachine;

mod moore;
pub use moore::MooreMachine;

mod reachability;
pub use reachability::ReachabilityMode;

mod transitions;
pub use transitions::{MealyTarget, StateSet, Target, TransitionTable};

/// States are identified by their position in the ordered sequence of states of a machine.
/// The state with index `0` is the initial state.
pub type StateIndex = usize;

/// Distinguishes the two kinds of machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomatonKind {
    /// Outputs are attached to transitions.
    Mealy,
    /// Outputs are attached to states.
    Moore,
}

impl Display for AutomatonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutomatonKind::Mealy => write!(f, "mealy"),
            AutomatonKind::Moore => write!(f, "moore"),
        }
    }
}

/// A machine of either kind. All operations dispatch on the kind through exhaustive
/// matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Automaton {
    /// A [`MealyMachine`].
    Mealy(MealyMachine),
    /// A [`MooreMachine`].
    Moore(MooreMachine),
}

impl Automaton {
    /// Parses `rows` into a machine of the given `kind`.
    pub fn parse<S: AsRef<str>>(rows: &[S], kind: AutomatonKind) -> Result<Self, FormatError> {
        Ok(match kind {
            AutomatonKind::Mealy => Automaton::Mealy(MealyMachine::try_from_rows(rows)?),
            AutomatonKind::Moore => Automaton::Moore(MooreMachine::try_from_rows(rows)?),
        })
    }

    /// Serializes the machine into rows of the same format that [`Self::parse`] accepts.
    pub fn to_rows(&self) -> Vec<String> {
        match self {
            Automaton::Mealy(mm) => mm.to_rows(),
            Automaton::Moore(mm) => mm.to_rows(),
        }
    }

    /// Returns the kind of the machine.
    pub fn kind(&self) -> AutomatonKind {
        match self {
            Automaton::Mealy(_) => AutomatonKind::Mealy,
            Automaton::Moore(_) => AutomatonKind::Moore,
        }
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states().len()
    }

    /// Returns the labels of the states.
    pub fn states(&self) -> &[String] {
        match self {
            Automaton::Mealy(mm) => mm.states(),
            Automaton::Moore(mm) => mm.states(),
        }
    }

    /// Gives a reference to the input alphabet.
    pub fn alphabet(&self) -> &InputAlphabet {
        match self {
            Automaton::Mealy(mm) => mm.alphabet(),
            Automaton::Moore(mm) => mm.alphabet(),
        }
    }

    /// Removes all states that are not reachable from the initial state, where reachability
    /// is understood as described by `mode`. Returns the number of removed states.
    pub fn prune_unreachable(&mut self, mode: ReachabilityMode) -> usize {
        match self {
            Automaton::Mealy(mm) => mm.prune_unreachable(mode),
            Automaton::Moore(mm) => mm.prune_unreachable(mode),
        }
    }
}

impl From<MealyMachine> for Automaton {
    fn from(value: MealyMachine) -> Self {
        Automaton::Mealy(value)
    }
}

impl From<MooreMachine> for Automaton {
    fn from(value: MooreMachine) -> Self {
        Automaton::Moore(value)
    }
}

/// Fails with [`FormatError::DuplicateState`] for the first label that occurs twice.
pub(crate) fn ensure_unique_states(states: &[String]) -> Result<(), FormatError> {
    let mut seen = math::Set::default();
    match states.iter().find(|q| !seen.insert(q.as_str())) {
        Some(duplicate) => Err(FormatError::DuplicateState(duplicate.clone())),
        None => Ok(()),
    }
}

/// Renders header rows and transition rows as an ASCII table. The first column holds the
/// input signals and is left empty for headers.
fn render_table<'a, H, R>(headers: H, rows: R) -> String
where
    H: IntoIterator<Item = Vec<String>>,
    R: IntoIterator<Item = (&'a str, Vec<String>)>,
{
    let mut b = tabled::builder::Builder::default();
    for header in headers {
        b.push_record(std::iter::once(String::new()).chain(header));
    }
    for (signal, targets) in rows {
        b.push_record(std::iter::once(signal.bold().to_string()).chain(targets));
    }
    b.build().with(tabled::settings::Style::ascii()).to_string()
}

impl Show for MealyMachine {
    fn show(&self) -> String {
        render_table(
            [self.states.clone()],
            self.alphabet.iter().zip(self.transitions.rows()).map(|(signal, row)| {
                (
                    signal,
                    row.iter()
                        .map(|t| format!("{}/{}", self.states[t.next()], t.output()))
                        .collect(),
                )
            }),
        )
    }
}

impl Show for MooreMachine {
    fn show(&self) -> String {
        render_table(
            [self.outputs.clone(), self.states.clone()],
            self.alphabet.iter().zip(self.transitions.rows()).map(|(signal, row)| {
                (
                    signal,
                    row.iter()
                        .map(|set| set.iter().map(|q| &self.states[q]).join(","))
                        .collect(),
                )
            }),
        )
    }
}

impl Show for Automaton {
    fn show(&self) -> String {
        match self {
            Automaton::Mealy(mm) => mm.show(),
            Automaton::Moore(mm) => mm.show(),
        }
    }
}
