use itertools::Itertools;

use crate::automaton::{MealyMachine, MooreMachine, StateSet};

use super::{FIELD_SEPARATOR, OUTPUT_SEPARATOR, SET_SEPARATOR};

/// Produces a header row, i.e. a row starting with an empty field.
fn header_row<'a, I: IntoIterator<Item = &'a String>>(fields: I) -> String {
    std::iter::once("")
        .chain(fields.into_iter().map(|f| f.as_str()))
        .join(&FIELD_SEPARATOR.to_string())
}

fn transition_row<I: IntoIterator<Item = String>>(signal: &str, targets: I) -> String {
    std::iter::once(signal.to_string())
        .chain(targets)
        .join(&FIELD_SEPARATOR.to_string())
}

impl MealyMachine {
    /// Serializes the machine into its header row followed by one row per input signal, in
    /// the order of the alphabet.
    pub fn to_rows(&self) -> Vec<String> {
        std::iter::once(header_row(&self.states))
            .chain(
                self.alphabet
                    .iter()
                    .zip(self.transitions.rows())
                    .map(|(signal, row)| {
                        transition_row(
                            signal,
                            row.iter().map(|t| {
                                format!("{}{OUTPUT_SEPARATOR}{}", self.states[t.next()], t.output())
                            }),
                        )
                    }),
            )
            .collect()
    }
}

impl MooreMachine {
    /// Writes a set of states as its labels, sorted and joined by commas. The empty set
    /// becomes an empty field.
    fn set_field(&self, set: &StateSet) -> String {
        set.iter()
            .map(|q| self.states[q].as_str())
            .sorted()
            .join(&SET_SEPARATOR.to_string())
    }

    /// Serializes the machine into its two header rows (outputs, then states) followed by one
    /// row per input signal, in the order of the alphabet.
    pub fn to_rows(&self) -> Vec<String> {
        [header_row(&self.outputs), header_row(&self.states)]
            .into_iter()
            .chain(
                self.alphabet
                    .iter()
                    .zip(self.transitions.rows())
                    .map(|(signal, row)| {
                        transition_row(signal, row.iter().map(|set| self.set_field(set)))
                    }),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn moore_sets_are_written_sorted_by_label() {
        let rows = [";0;;F", ";Z;A;M", "a;Z,M,A;;M", "b;A;Z;M"];
        let mm = MooreMachine::try_from_rows(&rows).unwrap();
        assert_eq!(
            mm.to_rows(),
            vec![";0;;F", ";Z;A;M", "a;A,M,Z;;M", "b;A;Z;M"]
        );
    }

    #[test]
    fn mealy_rows_reproduce_input() {
        let rows = [";A;B;C", "x;B/0;C/1;A/", "y;A/1;A/1;C/0"];
        let mm = MealyMachine::try_from_rows(&rows).unwrap();
        assert_eq!(mm.to_rows(), rows);
        assert_eq!(
            crate::rows::rows_to_string(&mm.to_rows()),
            ";A;B;C\nx;B/0;C/1;A/\ny;A/1;A/1;C/0\n"
        );
    }
}
