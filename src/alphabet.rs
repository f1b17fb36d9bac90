use crate::{math::IndexedSet, rows::FormatError};

/// The input signal that denotes a spontaneous (epsilon) transition.
pub const EPSILON: &str = "e";
/// The output that marks a finish (accepting) state of a Moore machine.
pub const FINISH: &str = "F";

/// The input alphabet of a machine is an ordered collection of input signals. The order of
/// the signals is the order of the transition rows, and the position of a signal is used to
/// index into a [`crate::automaton::TransitionTable`]. Signals are unique.
#[derive(Clone, Debug, Default)]
pub struct InputAlphabet(IndexedSet<String>);

impl PartialEq for InputAlphabet {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().eq(other.0.iter())
    }
}
impl Eq for InputAlphabet {}

impl InputAlphabet {
    /// Creates a new, empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to build an alphabet from the given signals, fails if a signal occurs twice.
    pub fn try_from_signals<I, S>(signals: I) -> Result<Self, FormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alphabet = Self::new();
        for signal in signals {
            alphabet.try_push(signal)?;
        }
        Ok(alphabet)
    }

    /// Appends `signal` to the alphabet and returns its position. Fails with
    /// [`FormatError::DuplicateSignal`] if the signal is already present.
    pub fn try_push<S: Into<String>>(&mut self, signal: S) -> Result<usize, FormatError> {
        let (position, inserted) = self.0.insert_full(signal.into());
        if inserted {
            Ok(position)
        } else {
            Err(FormatError::DuplicateSignal(self.0[position].clone()))
        }
    }

    /// Removes `signal` and returns the position it had. All signals after it move one
    /// position to the front.
    pub fn remove(&mut self, signal: &str) -> Option<usize> {
        self.0.shift_remove_full(signal).map(|(position, _)| position)
    }

    /// Returns the number of signals.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no signals.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the position of `signal`, if it is part of the alphabet.
    pub fn position(&self, signal: &str) -> Option<usize> {
        self.0.get_index_of(signal)
    }

    /// Returns true if `signal` is part of the alphabet.
    pub fn contains(&self, signal: &str) -> bool {
        self.0.contains(signal)
    }

    /// Gives the signal at position `position`.
    pub fn get(&self, position: usize) -> Option<&str> {
        self.0.get_index(position).map(|s| s.as_str())
    }

    /// Iterates over the signals in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|s| s.as_str())
    }
}

/// Collects signals into an alphabet. A signal that occurs more than once is kept at its
/// first position, use [`InputAlphabet::try_from_signals`] to reject duplicates instead.
impl<S: Into<String>> FromIterator<S> for InputAlphabet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
