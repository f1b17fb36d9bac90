use crate::{
    alphabet::InputAlphabet,
    automaton::{MealyMachine, MealyTarget, MooreMachine, StateIndex, StateSet, TransitionTable},
    math,
};

use super::{rows_from_str, FormatError, FIELD_SEPARATOR, OUTPUT_SEPARATOR, SET_SEPARATOR};

fn fields(row: &str) -> impl Iterator<Item = &str> {
    row.split(FIELD_SEPARATOR).map(str::trim)
}

/// Reads a header row, which has to start with an empty field, and returns its remaining
/// fields.
fn header<'a>(row: Option<&'a str>, what: &'static str) -> Result<Vec<&'a str>, FormatError> {
    let mut fields = fields(row.ok_or(FormatError::MissingHeader(what))?);
    match fields.next() {
        Some("") => Ok(fields.collect()),
        _ => Err(FormatError::MissingHeader(what)),
    }
}

/// Reads the header row that lists the states. Empty fields do not name a state.
fn state_header(row: Option<&str>) -> Result<Vec<String>, FormatError> {
    Ok(header(row, "states")?
        .into_iter()
        .filter(|q| !q.is_empty())
        .map(|q| q.to_string())
        .collect())
}

/// Resolves state labels to their index in the sequence of states.
struct StateLookup<'a>(math::Map<&'a str, StateIndex>);

impl<'a> StateLookup<'a> {
    fn new(states: &'a [String]) -> Self {
        Self(
            states
                .iter()
                .enumerate()
                .map(|(i, q)| (q.as_str(), i))
                .collect(),
        )
    }

    fn resolve(&self, name: &str) -> Result<StateIndex, FormatError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| FormatError::UnknownState(name.to_string()))
    }
}

/// Reads the transition rows that follow the headers. Every row has to start with a
/// non-empty input signal followed by exactly `size` targets, each of which is turned into a
/// `T` by `parse_target`, which receives the signal and the raw field.
fn transition_rows<S, T, F>(
    rows: &[S],
    size: usize,
    parse_target: F,
) -> Result<(InputAlphabet, TransitionTable<T>), FormatError>
where
    S: AsRef<str>,
    F: Fn(&str, &str) -> Result<T, FormatError>,
{
    let mut alphabet = InputAlphabet::new();
    let mut table = TransitionTable::default();

    for row in rows {
        let row = row.as_ref();
        let mut fields = fields(row);
        let signal = match fields.next() {
            Some(signal) if !signal.is_empty() => signal,
            _ => return Err(FormatError::MissingSignal(row.to_string())),
        };
        let targets: Vec<&str> = fields.collect();
        if targets.len() != size {
            return Err(FormatError::ColumnMismatch {
                signal: signal.to_string(),
                expected: size,
                found: targets.len(),
            });
        }
        alphabet.try_push(signal)?;
        table.push_row(
            targets
                .into_iter()
                .map(|target| parse_target(signal, target))
                .collect::<Result<_, _>>()?,
        );
    }

    Ok((alphabet, table))
}

impl MealyMachine {
    /// Builds a Mealy machine from its rows. The first row is the header that lists the
    /// states, every other row consists of an input signal followed by one `next/output`
    /// target per state.
    pub fn try_from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, FormatError> {
        let (first, rest) = rows.split_first().ok_or(FormatError::Empty)?;
        let states = state_header(Some(first.as_ref()))?;
        let lookup = StateLookup::new(&states);

        let (alphabet, transitions) = transition_rows(rest, states.len(), |signal, target| {
            let malformed = || FormatError::MalformedTarget {
                signal: signal.to_string(),
                target: target.to_string(),
            };
            let (next, output) = target.split_once(OUTPUT_SEPARATOR).ok_or_else(malformed)?;
            let next = next.trim();
            if next.is_empty() {
                return Err(malformed());
            }
            Ok(MealyTarget::new(lookup.resolve(next)?, output.trim()))
        })?;

        MealyMachine::try_new(states, alphabet, transitions)
    }

    /// Splits `input` into rows and calls [`Self::try_from_rows`].
    pub fn try_from_str(input: &str) -> Result<Self, FormatError> {
        Self::try_from_rows(&rows_from_str(input))
    }
}

impl MooreMachine {
    /// Builds a Moore machine from its rows. The first row lists the output of every state,
    /// the second row lists the states and every further row consists of an input signal
    /// followed by one target per state. A target is a comma separated set of states, an
    /// empty target stands for no transition.
    ///
    /// Outputs are taken positionally, so an empty field in the first row is an empty
    /// output. This is how non-accepting states of a nondeterministic machine are written.
    pub fn try_from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, FormatError> {
        if rows.is_empty() {
            return Err(FormatError::Empty);
        }
        let mut rows = rows.iter().map(|row| row.as_ref());
        let outputs: Vec<String> = header(rows.next(), "outputs")?
            .into_iter()
            .map(|o| o.to_string())
            .collect();
        let states = state_header(rows.next())?;
        let lookup = StateLookup::new(&states);
        let rest: Vec<&str> = rows.collect();

        let (alphabet, transitions) = transition_rows(&rest, states.len(), |signal, target| {
            if target.is_empty() {
                return Ok(StateSet::default());
            }
            target
                .split(SET_SEPARATOR)
                .map(str::trim)
                .map(|q| match q {
                    "" => Err(FormatError::MalformedTarget {
                        signal: signal.to_string(),
                        target: target.to_string(),
                    }),
                    q => lookup.resolve(q),
                })
                .collect()
        })?;

        MooreMachine::try_new(outputs, states, alphabet, transitions)
    }

    /// Splits `input` into rows and calls [`Self::try_from_rows`].
    pub fn try_from_str(input: &str) -> Result<Self, FormatError> {
        Self::try_from_rows(&rows_from_str(input))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn parse_mealy() {
        let mm = MealyMachine::try_from_str(
            ";A;B
            x;A/0;B/1
            y;B/ 1;A/0",
        )
        .unwrap();
        assert_eq!(mm.states(), &["A".to_string(), "B".to_string()]);
        assert_eq!(mm.alphabet().iter().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(mm.transition(0, "y"), Some(&MealyTarget::new(1, "1")));
        assert_eq!(mm.transition(1, "x"), Some(&MealyTarget::new(1, "1")));
    }

    #[test_log::test]
    fn parse_nondeterministic_moore() {
        let mm = MooreMachine::try_from_str(
            ";;;F
            ;A;B;C
            a;B,C;;C
            e;;C;",
        )
        .unwrap();
        assert_eq!(mm.outputs(), &["".to_string(), "".to_string(), "F".to_string()]);
        assert_eq!(mm.transition(0, "a"), Some(&StateSet::from_iter([1, 2])));
        assert_eq!(mm.transition(1, "a"), Some(&StateSet::default()));
        assert_eq!(mm.transition(1, "e"), Some(&StateSet::singleton(2)));
    }

    #[test]
    fn malformed_tables() {
        assert_eq!(MealyMachine::try_from_str(""), Err(FormatError::Empty));
        assert_eq!(
            MealyMachine::try_from_str("x;A/0;B/1"),
            Err(FormatError::MissingHeader("states"))
        );
        assert_eq!(
            MealyMachine::try_from_str(";A\nx;A/0"),
            Err(FormatError::TooFewStates(1))
        );
        assert_eq!(
            MealyMachine::try_from_str(";A;B\nx;A/0"),
            Err(FormatError::ColumnMismatch {
                signal: "x".into(),
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            MealyMachine::try_from_str(";A;B\nx;A/0;B1"),
            Err(FormatError::MalformedTarget {
                signal: "x".into(),
                target: "B1".into()
            })
        );
        assert_eq!(
            MealyMachine::try_from_str(";A;B\nx;A/0;C/1"),
            Err(FormatError::UnknownState("C".into()))
        );
        assert_eq!(
            MealyMachine::try_from_str(";A;B\nx;A/0;B/1\nx;A/0;B/1"),
            Err(FormatError::DuplicateSignal("x".into()))
        );
        assert_eq!(
            MealyMachine::try_from_str(";A;B\n;A/0;B/1"),
            Err(FormatError::MissingSignal(";A/0;B/1".into()))
        );
        assert_eq!(
            MooreMachine::try_from_str(";0;1\nx;A;B"),
            Err(FormatError::MissingHeader("states"))
        );
        assert_eq!(
            MooreMachine::try_from_str(";0\n;A;B\nx;A;B"),
            Err(FormatError::OutputCountMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            MooreMachine::try_from_str(";0;1\n;A;B\nx;A,,B;B"),
            Err(FormatError::MalformedTarget {
                signal: "x".into(),
                target: "A,,B".into()
            })
        );
    }
}
