use tracing::debug;

use crate::prelude::*;

/// Returns the label of the `i`-th state, which is the `i`-th alphanumeric character
/// starting from `A`.
fn state_label(i: usize) -> String {
    ('A'..)
        .filter(|c| c.is_alphanumeric())
        .nth(i)
        .map(String::from)
        .unwrap_or_else(|| format!("q{i}"))
}

fn labels(prefix: &str, count: usize) -> impl Iterator<Item = String> + '_ {
    (0..count).map(move |i| format!("{prefix}{i}"))
}

fn alphabet_of_size(signals: usize) -> InputAlphabet {
    labels("x", signals.max(1)).collect()
}

/// Generates a random complete Mealy machine. For each of the `states` states (at least two)
/// and each of the `signals` input signals (at least one), a target state is drawn uniformly
/// at random, as is one of `outputs` output signals (at least one). States are labeled by
/// single characters starting with `A`, input signals are `x0`, `x1`, ... and outputs are
/// `y0`, `y1`, ...
///
/// Depending on the drawn transitions, some states may be unreachable.
pub fn generate_random_mealy(states: usize, signals: usize, outputs: usize) -> MealyMachine {
    let size = states.max(2);
    let output_labels: Vec<String> = labels("y", outputs.max(1)).collect();
    let alphabet = alphabet_of_size(signals);
    let transitions = TransitionTable::from_rows(
        (0..alphabet.size())
            .map(|_| {
                (0..size)
                    .map(|_| {
                        MealyTarget::new(
                            fastrand::usize(..size),
                            output_labels[fastrand::usize(..output_labels.len())].clone(),
                        )
                    })
                    .collect()
            })
            .collect(),
    );
    debug!("generated random mealy machine with {size} states");
    MealyMachine {
        states: (0..size).map(state_label).collect(),
        alphabet,
        transitions,
    }
}

/// Works as [`generate_random_mealy`], but generates a complete deterministic Moore machine
/// by drawing one output for every state instead of every transition.
pub fn generate_random_moore(states: usize, signals: usize, outputs: usize) -> MooreMachine {
    let size = states.max(2);
    let output_labels: Vec<String> = labels("y", outputs.max(1)).collect();
    let alphabet = alphabet_of_size(signals);
    let transitions = TransitionTable::from_rows(
        (0..alphabet.size())
            .map(|_| {
                (0..size)
                    .map(|_| StateSet::singleton(fastrand::usize(..size)))
                    .collect()
            })
            .collect(),
    );
    debug!("generated random moore machine with {size} states");
    MooreMachine {
        outputs: (0..size)
            .map(|_| output_labels[fastrand::usize(..output_labels.len())].clone())
            .collect(),
        states: (0..size).map(state_label).collect(),
        alphabet,
        transitions,
    }
}

/// Generates a random nondeterministic Moore machine which may be determinized. There are
/// `states` states (at least two) and `signals` input signals (at least one), followed by
/// the [`EPSILON`] signal. Every state has a transition to each state with probability
/// one in four, so transitions may also lead nowhere. Every third state, starting with the
/// initial state, carries the [`FINISH`] output and all others carry the empty output.
pub fn generate_random_nfa(states: usize, signals: usize) -> MooreMachine {
    let size = states.max(2);
    let alphabet: InputAlphabet = labels("x", signals.max(1))
        .chain(std::iter::once(EPSILON.to_string()))
        .collect();
    let transitions = TransitionTable::from_rows(
        (0..alphabet.size())
            .map(|_| {
                (0..size)
                    .map(|_| (0..size).filter(|_| fastrand::u8(..4) == 0).collect())
                    .collect()
            })
            .collect(),
    );
    debug!("generated random nondeterministic moore machine with {size} states");
    MooreMachine {
        outputs: (0..size)
            .map(|q| match q % 3 {
                0 => FINISH.to_string(),
                _ => String::new(),
            })
            .collect(),
        states: (0..size).map(state_label).collect(),
        alphabet,
        transitions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn random_machines_are_well_formed() {
        for _ in 0..20 {
            let mealy = generate_random_mealy(8, 3, 2);
            assert_eq!(mealy.size(), 8);
            assert!(MealyMachine::try_from_rows(&mealy.to_rows()).is_ok());

            let moore = generate_random_moore(8, 3, 2);
            assert!(moore.is_deterministic());
            assert_eq!(MooreMachine::try_from_rows(&moore.to_rows()), Ok(moore));
        }
        assert_eq!(generate_random_mealy(0, 0, 0).size(), 2);
    }

    #[test_log::test]
    fn random_nfas_can_be_read_back() {
        for _ in 0..20 {
            let nfa = generate_random_nfa(6, 2);
            assert_eq!(nfa.alphabet().size(), 3);
            assert!(nfa.alphabet().contains(EPSILON));
            assert_eq!(MooreMachine::try_from_rows(&nfa.to_rows()), Ok(nfa));
        }
    }
}
