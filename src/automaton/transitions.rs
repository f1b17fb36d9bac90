use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;

use crate::{alphabet::InputAlphabet, math::OrderedSet, rows::FormatError, Show};

use super::StateIndex;

/// A target is what a transition table stores for a state and an input signal. It knows
/// which states it leads to and can be rewritten when states are renumbered.
pub trait Target: Clone + Eq + Hash + Debug {
    /// Returns an iterator over the states that the target leads to.
    fn destinations(&self) -> impl Iterator<Item = StateIndex> + '_;

    /// Produces a copy of `self` where every state index is passed through `f`.
    fn relabel<F: Fn(StateIndex) -> StateIndex>(&self, f: F) -> Self;
}

/// The target of a transition in a Mealy machine, consisting of the next state and the
/// output that is emitted when the transition is taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MealyTarget {
    next: StateIndex,
    output: String,
}

impl MealyTarget {
    /// Creates a new target leading to `next` and emitting `output`.
    pub fn new<S: Into<String>>(next: StateIndex, output: S) -> Self {
        Self {
            next,
            output: output.into(),
        }
    }

    /// The state that is reached.
    pub fn next(&self) -> StateIndex {
        self.next
    }

    /// The output that is emitted.
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Target for MealyTarget {
    fn destinations(&self) -> impl Iterator<Item = StateIndex> + '_ {
        std::iter::once(self.next)
    }

    fn relabel<F: Fn(StateIndex) -> StateIndex>(&self, f: F) -> Self {
        Self::new(f(self.next), self.output.clone())
    }
}

/// A set of states, which is the target of a transition in a (possibly nondeterministic)
/// Moore machine. A deterministic transition leads to a singleton set, an empty set means
/// that there is no transition.
///
/// The states are kept sorted by their index, so two sets are equal if and only if they
/// contain the same states. This makes a [`StateSet`] usable as the identity of a state in
/// the subset construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSet(OrderedSet<StateIndex>);

impl StateSet {
    /// Creates the set containing only `q`.
    pub fn singleton(q: StateIndex) -> Self {
        Self(OrderedSet::from_iter([q]))
    }

    /// Returns the single state contained in `self`, or `None` if there are zero or
    /// multiple states.
    pub fn single(&self) -> Option<StateIndex> {
        match self.0.len() {
            1 => self.0.first().copied(),
            _ => None,
        }
    }

    /// Adds `q` to the set, returns true if it was not present before.
    pub fn insert(&mut self, q: StateIndex) -> bool {
        self.0.insert(q)
    }

    /// Checks whether `q` is an element of the set.
    pub fn contains(&self, q: StateIndex) -> bool {
        self.0.contains(&q)
    }

    /// The number of states in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set contains no states.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the states in ascending order of their index.
    pub fn iter(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.0.iter().copied()
    }
}

impl Target for StateSet {
    fn destinations(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.iter()
    }

    fn relabel<F: Fn(StateIndex) -> StateIndex>(&self, f: F) -> Self {
        self.iter().map(f).collect()
    }
}

impl FromIterator<StateIndex> for StateSet {
    fn from_iter<T: IntoIterator<Item = StateIndex>>(iter: T) -> Self {
        Self(OrderedSet::from_iter(iter))
    }
}

impl Extend<StateIndex> for StateSet {
    fn extend<T: IntoIterator<Item = StateIndex>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl Show for StateSet {
    fn show(&self) -> String {
        if self.is_empty() {
            "∅".to_string()
        } else {
            format!("{{{}}}", self.iter().join(", "))
        }
    }
}

/// Stores the transitions of a machine. There is one row per input signal, aligned with
/// the [`InputAlphabet`], and every row holds one target per state, aligned with the
/// sequence of states. Transformations never edit a table in place, they build a new one
/// and swap it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable<T> {
    rows: Vec<Vec<T>>,
}

impl<T> Default for TransitionTable<T> {
    fn default() -> Self {
        Self { rows: vec![] }
    }
}

impl<T> TransitionTable<T> {
    /// Creates a table from the given rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        Self { rows }
    }

    /// Gives all rows, one per input signal.
    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    /// Returns the row of the input signal at position `signal`.
    pub fn row(&self, signal: usize) -> Option<&[T]> {
        self.rows.get(signal).map(|row| row.as_slice())
    }

    /// Returns the target of `state` on the input signal at position `signal`.
    pub fn target(&self, signal: usize, state: StateIndex) -> Option<&T> {
        self.rows.get(signal).and_then(|row| row.get(state))
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<T>) {
        self.rows.push(row)
    }

    /// Removes the row at position `signal` and returns it.
    pub fn remove_row(&mut self, signal: usize) -> Option<Vec<T>> {
        (signal < self.rows.len()).then(|| self.rows.remove(signal))
    }

    /// The number of rows.
    pub fn signals(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over the targets of `state`, one per input signal.
    pub fn column(&self, state: StateIndex) -> impl Iterator<Item = &T> + '_ {
        self.rows.iter().filter_map(move |row| row.get(state))
    }

    /// Builds a new table by applying `f` to every target.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> TransitionTable<U> {
        TransitionTable {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(&mut f).collect())
                .collect(),
        }
    }
}

impl<T: Target> TransitionTable<T> {
    /// Iterates over all states that can be reached from `state` with a single transition.
    pub fn successors(&self, state: StateIndex) -> impl Iterator<Item = StateIndex> + '_ {
        self.column(state).flat_map(|target| target.destinations())
    }

    /// Builds a new table which only contains the columns of states `q` for which `keep[q]`
    /// holds. States are renumbered consecutively, so retained states must never lead to
    /// a state that is dropped.
    pub fn retain_columns(&self, keep: &[bool]) -> Self {
        let mut remap = vec![None; keep.len()];
        for (new, old) in keep.iter().positions(|k| *k).enumerate() {
            remap[old] = Some(new);
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(target, _)| {
                        target.relabel(|q| {
                            debug_assert!(remap[q].is_some(), "kept state leads to dropped {q}");
                            remap[q].unwrap_or(q)
                        })
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Checks that there is one row per signal of `alphabet`, that every row has `size`
    /// targets and that every target stays within `size` states.
    pub(crate) fn validate(
        &self,
        size: usize,
        alphabet: &InputAlphabet,
    ) -> Result<(), FormatError> {
        if self.rows.len() != alphabet.size() {
            return Err(FormatError::RowCountMismatch {
                expected: alphabet.size(),
                found: self.rows.len(),
            });
        }
        for (row, signal) in self.rows.iter().zip(alphabet.iter()) {
            if row.len() != size {
                return Err(FormatError::ColumnMismatch {
                    signal: signal.to_string(),
                    expected: size,
                    found: row.len(),
                });
            }
            if let Some(index) = row
                .iter()
                .flat_map(|target| target.destinations())
                .find(|q| *q >= size)
            {
                return Err(FormatError::TargetOutOfRange { index, size });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retaining_columns_renumbers_states() {
        let table = TransitionTable::from_rows(vec![
            vec![
                MealyTarget::new(2, "0"),
                MealyTarget::new(1, "1"),
                MealyTarget::new(0, "1"),
            ],
            vec![
                MealyTarget::new(0, "x"),
                MealyTarget::new(1, "x"),
                MealyTarget::new(2, "x"),
            ],
        ]);
        let retained = table.retain_columns(&[true, false, true]);
        assert_eq!(
            retained.row(0).unwrap(),
            &[MealyTarget::new(1, "0"), MealyTarget::new(0, "1")]
        );
        assert_eq!(
            retained.row(1).unwrap(),
            &[MealyTarget::new(0, "x"), MealyTarget::new(1, "x")]
        );
    }

    #[test]
    fn state_sets() {
        let set: StateSet = [3, 1, 2, 1].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.single(), None);
        assert_eq!(set.show(), "{1, 2, 3}");
        assert_eq!(StateSet::default().show(), "∅");
        assert_eq!(StateSet::singleton(4).single(), Some(4));
        assert_eq!(set.relabel(|q| q % 2), [0, 1].into_iter().collect());
    }
}
