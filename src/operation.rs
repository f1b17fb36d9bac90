use std::{fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::{
    automaton::{Automaton, AutomatonKind, MealyMachine, MooreMachine},
    conversion::ConversionOptions,
    determinization::DeterminizationOptions,
    minimization::MinimizationOptions,
    rows::FormatError,
};

/// Errors that are caused by the way an operation is requested, before any machine is read.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum ArgumentError {
    #[error("unknown mode `{0}`, expected one of mealy-to-moore, moore-to-mealy, mealy, moore, determinize")]
    UnknownMode(String),
    #[error("argument `{0}` must not be blank")]
    Blank(&'static str),
    #[error("invalid arguments: {0}")]
    Usage(String),
    #[error("invalid value `{value}` for `{name}`: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// The transformations that can be applied to a machine. Each operation reads a machine of
/// a fixed kind, see [`Operation::source_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Converts a Mealy machine into a Moore machine.
    MealyToMoore,
    /// Converts a Moore machine into a Mealy machine.
    MooreToMealy,
    /// Minimizes a Mealy machine.
    MinimizeMealy,
    /// Minimizes a Moore machine.
    MinimizeMoore,
    /// Determinizes a Moore machine which may have epsilon transitions.
    Determinize,
}

impl Operation {
    /// All operations, in the order in which they are listed in help texts.
    pub const ALL: [Operation; 5] = [
        Operation::MealyToMoore,
        Operation::MooreToMealy,
        Operation::MinimizeMealy,
        Operation::MinimizeMoore,
        Operation::Determinize,
    ];

    /// The name under which the operation is selected.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::MealyToMoore => "mealy-to-moore",
            Operation::MooreToMealy => "moore-to-mealy",
            Operation::MinimizeMealy => "mealy",
            Operation::MinimizeMoore => "moore",
            Operation::Determinize => "determinize",
        }
    }

    /// The kind of machine that the operation reads.
    pub fn source_kind(&self) -> AutomatonKind {
        match self {
            Operation::MealyToMoore | Operation::MinimizeMealy => AutomatonKind::Mealy,
            Operation::MooreToMealy | Operation::MinimizeMoore | Operation::Determinize => {
                AutomatonKind::Moore
            }
        }
    }

    /// Parses `rows` as a machine of the [`Operation::source_kind`] and applies the
    /// operation to it. The result is only produced if every step succeeds, it can be
    /// serialized with [`Automaton::to_rows`].
    pub fn apply<S: AsRef<str>>(
        &self,
        rows: &[S],
        config: &Config,
    ) -> Result<Automaton, FormatError> {
        trace!("applying {self} to {} rows of a {} machine", rows.len(), self.source_kind());
        let result: Automaton = match self {
            Operation::MealyToMoore => read_mealy(rows)?.to_moore(&config.conversion).into(),
            Operation::MooreToMealy => read_moore(rows)?.to_mealy()?.into(),
            Operation::MinimizeMealy => {
                let mut mm = read_mealy(rows)?;
                mm.minimize(&config.minimization);
                mm.into()
            }
            Operation::MinimizeMoore => {
                let mut mm = read_moore(rows)?;
                mm.minimize(&config.minimization)?;
                mm.into()
            }
            Operation::Determinize => {
                let mut mm = read_moore(rows)?;
                mm.determinize(&config.determinization);
                mm.into()
            }
        };
        debug!("{self} produced {} machine with {} states", result.kind(), result.size());
        Ok(result)
    }
}

fn read_mealy<S: AsRef<str>>(rows: &[S]) -> Result<MealyMachine, FormatError> {
    let mm = MealyMachine::try_from_rows(rows)?;
    info!(
        "read mealy machine with {} states and {} input signals",
        mm.size(),
        mm.alphabet().size()
    );
    Ok(mm)
}

fn read_moore<S: AsRef<str>>(rows: &[S]) -> Result<MooreMachine, FormatError> {
    let mm = MooreMachine::try_from_rows(rows)?;
    info!(
        "read moore machine with {} states and {} input signals",
        mm.size(),
        mm.alphabet().size()
    );
    Ok(mm)
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operation {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim();
        if mode.is_empty() {
            return Err(ArgumentError::Blank("mode"));
        }
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == mode)
            .ok_or_else(|| ArgumentError::UnknownMode(mode.to_string()))
    }
}

/// Collects the options of all operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Used by [`Operation::MealyToMoore`].
    pub conversion: ConversionOptions,
    /// Used by [`Operation::MinimizeMealy`] and [`Operation::MinimizeMoore`].
    pub minimization: MinimizationOptions,
    /// Used by [`Operation::Determinize`].
    pub determinization: DeterminizationOptions,
}
