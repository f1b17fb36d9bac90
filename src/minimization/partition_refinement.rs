use std::hash::Hash;

use tracing::trace;

use crate::{automaton::StateIndex, math};

/// Numbers the given keys in the order in which they are first seen. Equal keys receive the
/// same number.
fn first_seen<K: Hash + Eq, I: IntoIterator<Item = K>>(keys: I) -> (Vec<usize>, usize) {
    let mut seen: math::IndexedSet<K> = math::IndexedSet::default();
    let assignment = keys.into_iter().map(|key| seen.insert_full(key).0).collect();
    (assignment, seen.len())
}

/// Refines the partition of `size` states that is given by the class keys `initial` until it
/// becomes stable. In each round, every state is given the pair of its current class and its
/// `signature`, which may depend on the current class of every state (given as a slice that
/// assigns each state its class). Two states stay together if and only if their pairs agree,
/// and the new classes are numbered in the order in which their pairs are first seen. The
/// refinement stops as soon as every state has its own class or a round does not increase the
/// number of classes.
///
/// Returns the final assignment of a class to each state. Since classes are numbered by first
/// occurrence, the state `0` is always in class `0`.
pub(crate) fn refine<I, C, K, F>(initial: I, signature: F) -> Vec<usize>
where
    I: IntoIterator<Item = C>,
    C: Hash + Eq,
    K: Hash + Eq,
    F: Fn(StateIndex, &[usize]) -> K,
{
    let (mut assignment, mut classes) = first_seen(initial);
    let size = assignment.len();
    let mut round = 0;

    while classes < size {
        round += 1;
        let (refined, refined_classes) = first_seen(
            (0..size).map(|q| (assignment[q], signature(q, &assignment))),
        );
        trace!("round {round} refined {classes} classes into {refined_classes}");
        assignment = refined;
        if refined_classes == classes {
            break;
        }
        classes = refined_classes;
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::refine;

    #[test_log::test]
    fn refinement_splits_until_stable() {
        // a chain 0 -> 1 -> 2 -> 3 -> 3 where only state 3 is marked
        let next = [1, 2, 3, 3];
        let marked = [false, false, false, true];
        let assignment = refine(marked, |q, classes| classes[next[q]]);
        assert_eq!(assignment, vec![0, 1, 2, 3]);

        // 0 and 1 loop between each other, they can not be told apart
        let next = [1, 0, 2];
        let marked = [false, false, true];
        assert_eq!(refine(marked, |q, classes| classes[next[q]]), vec![0, 0, 1]);
    }
}
