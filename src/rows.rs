//! A machine is written as a sequence of rows, each row consists of fields that are
//! separated by `;`. Rows which start with an empty field are header rows.
//!
//! A Mealy machine has a single header row listing its states, every following row starts
//! with an input signal and contains one target `next/output` per state:
//! ```text
//! ;A;B
//! x;A/0;B/1
//! y;B/1;A/0
//! ```
//! A Moore machine has two header rows, the first one lists the output of every state and
//! the second one the states themselves. Its targets are bare state names, or, for a
//! nondeterministic machine, comma separated sets of states. An empty target means that
//! there is no transition.
//! ```text
//! ;0;1;F
//! ;A;B;C
//! x;B;C;C
//! e;B,C;;
//! ```
use thiserror::Error;

/// Contains the parsers that turn rows into machines.
pub mod input;
/// Contains the serialization of machines into rows.
pub mod output;

/// The character that separates the fields of a row.
pub const FIELD_SEPARATOR: char = ';';
/// The character that separates the next state from the output in a Mealy target.
pub const OUTPUT_SEPARATOR: char = '/';
/// The character that separates the states in a nondeterministic Moore target.
pub const SET_SEPARATOR: char = ',';

/// Abstracts the types of errors that can occur when a machine is built from rows, or when a
/// machine does not have the shape an operation requires. Any such error is detected before
/// a transformation starts, so a machine is never partially transformed.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum FormatError {
    #[error("machine description is empty")]
    Empty,
    #[error("missing header row with {0}")]
    MissingHeader(&'static str),
    #[error("invalid states count {0}, a machine needs at least two states")]
    TooFewStates(usize),
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),
    #[error("input signal `{0}` is declared more than once")]
    DuplicateSignal(String),
    #[error("transition row `{0}` does not start with an input signal")]
    MissingSignal(String),
    #[error("invalid action line for `{signal}`: expected {expected} targets, found {found}")]
    ColumnMismatch {
        signal: String,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} output signals, found {found}")]
    OutputCountMismatch { expected: usize, found: usize },
    #[error("expected {expected} transition rows, found {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("malformed target `{target}` for input signal `{signal}`")]
    MalformedTarget { signal: String, target: String },
    #[error("unknown state `{0}`")]
    UnknownState(String),
    #[error("target {index} is out of range for a machine with {size} states")]
    TargetOutOfRange { index: usize, size: usize },
    #[error("transition of state `{state}` on `{signal}` does not lead to exactly one state")]
    Nondeterministic { state: String, signal: String },
}

/// Splits `input` into rows, trimming surrounding whitespace and dropping lines that are empty.
pub fn rows_from_str(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Joins `rows` into a single string, terminating every row with a newline. Empty rows are
/// never written.
pub fn rows_to_string<S: AsRef<str>>(rows: &[S]) -> String {
    rows.iter()
        .map(|row| row.as_ref())
        .filter(|row| !row.is_empty())
        .fold(String::new(), |mut acc, row| {
            acc.push_str(row);
            acc.push('\n');
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_dropped() {
        let rows = rows_from_str(";A;B\r\n\n   \nx;A/0;B/1\n");
        assert_eq!(rows, vec![";A;B".to_string(), "x;A/0;B/1".to_string()]);
        assert_eq!(rows_to_string(&rows), ";A;B\nx;A/0;B/1\n");
    }
}
