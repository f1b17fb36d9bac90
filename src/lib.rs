//! Library for transforming finite state machines that are given as text tables.
//!
//! A machine is either a Mealy machine, where every transition emits an output, or a Moore
//! machine, where every state carries an output. Both are stored the same way: an ordered
//! sequence of state labels, an ordered [`alphabet::InputAlphabet`] of input signals and a
//! [`automaton::TransitionTable`] which holds one row per input signal and one target per
//! state. The position of a state in the sequence of states is its [`automaton::StateIndex`],
//! the state at position `0` is the initial state.
//!
//! The textual representation consists of rows of `;`-separated fields. Rows that start with an
//! empty field are header rows, a Mealy machine has one (the states) and a Moore machine has two
//! (the outputs, followed by the states). Every other row starts with an input signal and lists
//! one target per state. See [`rows`] for the details.
//!
//! On top of this model, the crate implements
//! - conversion between the two kinds of machines (see [`conversion`]),
//! - removal of unreachable states (see [`automaton::ReachabilityMode`]),
//! - minimization through partition refinement (see [`minimization`]),
//! - determinization of Moore machines with epsilon transitions through the subset
//!   construction (see [`determinization`]).
//!
//! Every operation consumes one complete machine and produces a complete new one, the
//! [`operation::Operation`] type ties parsing and one transformation together.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_tables::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{InputAlphabet, EPSILON, FINISH},
        automaton::{
            Automaton, AutomatonKind, MealyMachine, MealyTarget, MooreMachine, ReachabilityMode,
            StateIndex, StateSet, Target, TransitionTable,
        },
        conversion::{ConversionOptions, InitialState},
        determinization::DeterminizationOptions,
        math,
        minimization::MinimizationOptions,
        operation::{ArgumentError, Config, Operation},
        rows::FormatError,
        Show,
    };
}

/// Defines some mathematical objects which are used throughout the crate, such as sets, maps
/// and partitions.
pub mod math;

/// Module that contains the input alphabet of a machine.
pub mod alphabet;

/// Defines Mealy and Moore machines, their transition tables and the removal of unreachable
/// states.
pub mod automaton;

/// Parsing and serialization of the row based text format.
pub mod rows;

/// Conversion between Mealy and Moore machines.
pub mod conversion;

/// Contains the partition refinement that minimizes Mealy and Moore machines.
pub mod minimization;

/// Implements epsilon closures and the subset construction for Moore machines.
pub mod determinization;

/// Ties together parsing and one transformation.
pub mod operation;

/// Implements the generation of random machines.
#[cfg(feature = "random")]
pub mod random;

/// Helper trait which can be used to display states, sets of states and whole machines.
pub trait Show {
    /// Returns a human readable representation of `self`. This is mainly used for debugging
    /// purposes and for pretty printing a machine.
    fn show(&self) -> String;
}
