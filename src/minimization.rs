pub(crate) mod partition_refinement;

use tracing::debug;

use crate::{
    automaton::{
        MealyMachine, MealyTarget, MooreMachine, ReachabilityMode, StateSet, TransitionTable,
    },
    math::Partition,
    rows::FormatError,
};

/// Configures the minimization of a machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MinimizationOptions {
    /// Decides which states are removed as unreachable before the states are merged.
    pub reachability: ReachabilityMode,
}

impl MinimizationOptions {
    /// Creates options that use the given [`ReachabilityMode`].
    pub fn with_reachability(reachability: ReachabilityMode) -> Self {
        Self { reachability }
    }
}

fn class_names(classes: usize) -> Vec<String> {
    (0..classes).map(|i| format!("q{i}")).collect()
}

impl MealyMachine {
    /// Minimizes the machine in place. Unreachable states are removed first, then the
    /// states are merged by partition refinement. All states start out in one class, the
    /// signature of a state consists of the class of its successor and the emitted output
    /// for every input signal. Each class of the stable partition becomes one state named
    /// `q0`, `q1`, ..., which behaves like the first state of the class.
    pub fn minimize(&mut self, options: &MinimizationOptions) {
        let before = self.size();
        self.prune_unreachable(options.reachability);

        let transitions = &self.transitions;
        let assignment = partition_refinement::refine(vec![(); self.size()], |q, classes| {
            transitions
                .column(q)
                .map(|t| (classes[t.next()], t.output()))
                .collect::<Vec<_>>()
        });
        let partition = Partition::from_assignment(&assignment);

        self.transitions = TransitionTable::from_rows(
            self.transitions
                .rows()
                .iter()
                .map(|row| {
                    partition
                        .iter()
                        .filter_map(|class| class.first())
                        .map(|&rep| {
                            let target = &row[rep];
                            MealyTarget::new(assignment[target.next()], target.output())
                        })
                        .collect()
                })
                .collect(),
        );
        self.states = class_names(partition.size());
        debug!("minimized mealy machine from {before} to {} states", self.size());
    }
}

impl MooreMachine {
    /// Minimizes the machine in place. Unreachable states are removed first, then the
    /// states are merged by partition refinement. The initial partition groups states by
    /// their output, the signature of a state consists of the class of its successor for
    /// every input signal. Each class of the stable partition becomes one state named `q0`,
    /// `q1`, ..., which behaves like the first state of the class and has its output.
    ///
    /// Fails with [`FormatError::Nondeterministic`] if some transition does not lead to
    /// exactly one state, in which case the machine is left untouched.
    pub fn minimize(&mut self, options: &MinimizationOptions) -> Result<(), FormatError> {
        self.successors()?;
        let before = self.size();
        self.prune_unreachable(options.reachability);

        let successors = self.successors()?;
        let assignment = partition_refinement::refine(self.outputs.clone(), |q, classes| {
            successors
                .iter()
                .map(|row| classes[row[q]])
                .collect::<Vec<_>>()
        });
        let partition = Partition::from_assignment(&assignment);
        let representatives: Vec<usize> = partition
            .iter()
            .filter_map(|class| class.first().copied())
            .collect();

        self.transitions = TransitionTable::from_rows(
            successors
                .iter()
                .map(|row| {
                    representatives
                        .iter()
                        .map(|&rep| StateSet::singleton(assignment[row[rep]]))
                        .collect()
                })
                .collect(),
        );
        self.outputs = representatives
            .iter()
            .map(|&rep| self.outputs[rep].clone())
            .collect();
        self.states = class_names(partition.size());
        debug!("minimized moore machine from {before} to {} states", self.size());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn mealy_with_equivalent_states() {
        let mut mm = MealyMachine::try_from_str(
            ";A;B;C
            x;B/0;C/1;C/1
            y;A/1;A/0;A/0",
        )
        .unwrap();
        let original = mm.clone();
        mm.minimize(&MinimizationOptions::default());
        assert_eq!(mm.size(), 2);
        assert_eq!(mm.to_rows(), vec![";q0;q1", "x;q1/0;q1/1", "y;q0/1;q0/0"]);
        assert!(mm.bisimilar(&original));
    }

    #[test_log::test]
    fn mealy_outputs_separate_states() {
        let mut mm = MealyMachine::try_from_str(
            ";A;B;C
            x;B/0;C/0;A/0
            y;A/0;A/0;A/1",
        )
        .unwrap();
        let original = mm.clone();
        mm.minimize(&MinimizationOptions::default());
        assert_eq!(mm.size(), 3);
        assert!(mm.bisimilar(&original));
    }

    #[test_log::test]
    fn moore_minimization() {
        let mut mm = MooreMachine::try_from_str(
            ";0;1;1;0
            ;A;B;C;D
            a;B;C;B;A
            b;D;A;A;D",
        )
        .unwrap();
        let original = mm.clone();
        mm.minimize(&MinimizationOptions::default()).unwrap();
        assert_eq!(
            mm.to_rows(),
            vec![";0;1;0", ";q0;q1;q2", "a;q1;q1;q0", "b;q2;q0;q2"]
        );
        assert!(mm.bisimilar(&original));

        let minimal = mm.clone();
        mm.minimize(&MinimizationOptions::default()).unwrap();
        assert_eq!(mm, minimal);
    }

    #[test_log::test]
    fn unreachable_states_are_removed_before_merging() {
        let mut mm = MooreMachine::try_from_str(
            ";0;1;0
            ;A;B;C
            a;B;A;C",
        )
        .unwrap();
        mm.minimize(&MinimizationOptions::default()).unwrap();
        assert_eq!(mm.to_rows(), vec![";0;1", ";q0;q1", "a;q1;q0"]);
    }

    #[test]
    fn nondeterministic_moore_is_rejected() {
        let mut mm = MooreMachine::try_from_str(
            ";0;1
            ;A;B
            a;A;",
        )
        .unwrap();
        let before = mm.clone();
        assert!(matches!(
            mm.minimize(&MinimizationOptions::default()),
            Err(FormatError::Nondeterministic { .. })
        ));
        assert_eq!(mm, before);
    }

    #[cfg(feature = "random")]
    #[test_log::test]
    fn random_minimization_is_idempotent_and_monotone() {
        use crate::random::{generate_random_mealy, generate_random_moore};

        let graph = MinimizationOptions::with_reachability(ReachabilityMode::Graph);
        for _ in 0..50 {
            let original = generate_random_mealy(8, 2, 2);
            let mut minimized = original.clone();
            minimized.minimize(&MinimizationOptions::default());
            assert!(minimized.size() <= original.size());
            assert_eq!(minimized.witness_inequivalence(&original), None);

            minimized.minimize(&graph);
            let once = minimized.clone();
            minimized.minimize(&graph);
            assert_eq!(minimized, once);

            let original = generate_random_moore(8, 2, 2);
            let mut minimized = original.clone();
            minimized.minimize(&graph).unwrap();
            assert!(minimized.size() <= original.size());
            assert_eq!(minimized.witness_non_bisimilarity(&original), None);
            let once = minimized.clone();
            minimized.minimize(&graph).unwrap();
            assert_eq!(minimized, once);
        }
    }
}
