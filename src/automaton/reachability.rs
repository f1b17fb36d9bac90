use std::{collections::VecDeque, str::FromStr};

use bit_set::BitSet;
use tracing::{debug, trace};

use super::{MealyMachine, MooreMachine, Target, TransitionTable};

/// Determines which states count as reachable from the initial state when unreachable
/// states are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReachabilityMode {
    /// A state is reachable if it is the initial state, or if some transition of a
    /// *different* state leads to it. Whether that other state is reachable itself is not
    /// taken into account, so this over-approximates the set of reachable states. This is
    /// the relation the table tools have always used and remains the default.
    #[default]
    ColumnWise,
    /// A state is reachable if there is a path from the initial state to it.
    Graph,
}

impl FromStr for ReachabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "column-wise" => Ok(ReachabilityMode::ColumnWise),
            "graph" => Ok(ReachabilityMode::Graph),
            other => Err(format!("unknown reachability mode `{other}`")),
        }
    }
}

impl ReachabilityMode {
    /// Computes which of the `size` states with transitions `table` are reachable from the
    /// initial state. The returned vector holds one flag per state.
    pub fn reachable<T: Target>(&self, table: &TransitionTable<T>, size: usize) -> Vec<bool> {
        match self {
            ReachabilityMode::ColumnWise => column_wise(table, size),
            ReachabilityMode::Graph => graph(table, size),
        }
    }
}

fn column_wise<T: Target>(table: &TransitionTable<T>, size: usize) -> Vec<bool> {
    let mut reachable = vec![false; size];
    if let Some(initial) = reachable.first_mut() {
        *initial = true;
    }
    for row in table.rows() {
        for (column, target) in row.iter().enumerate() {
            for destination in target.destinations().filter(|d| *d != column) {
                reachable[destination] = true;
            }
        }
    }
    reachable
}

fn graph<T: Target>(table: &TransitionTable<T>, size: usize) -> Vec<bool> {
    let mut seen = BitSet::with_capacity(size);
    if size == 0 {
        return vec![];
    }
    seen.insert(0);
    let mut queue = VecDeque::from([0]);
    while let Some(q) = queue.pop_front() {
        for p in table.successors(q) {
            if seen.insert(p) {
                queue.push_back(p);
            }
        }
    }
    (0..size).map(|q| seen.contains(q)).collect()
}

/// Logs the states that are about to be removed and returns how many there are.
fn report_unreachable(states: &[String], reachable: &[bool]) -> usize {
    let unreachable: Vec<&String> = states
        .iter()
        .zip(reachable)
        .filter(|(_, r)| !**r)
        .map(|(q, _)| q)
        .collect();
    for q in &unreachable {
        trace!("removing unreachable state {q}");
    }
    unreachable.len()
}

fn retain<X: Clone>(items: &[X], keep: &[bool]) -> Vec<X> {
    items
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(x, _)| x.clone())
        .collect()
}

impl MealyMachine {
    /// Removes every state that is not reachable from the initial state according to
    /// `mode`, together with its column in the transition table. The initial state is
    /// always kept. Returns the number of removed states.
    pub fn prune_unreachable(&mut self, mode: ReachabilityMode) -> usize {
        let reachable = mode.reachable(&self.transitions, self.size());
        let removed = report_unreachable(&self.states, &reachable);
        if removed == 0 {
            return 0;
        }
        self.transitions = self.transitions.retain_columns(&reachable);
        self.states = retain(&self.states, &reachable);
        debug!("removed {removed} unreachable states, {} remain", self.size());
        removed
    }
}

impl MooreMachine {
    /// Removes every state that is not reachable from the initial state according to
    /// `mode`, together with its column in the transition table and its output. The
    /// initial state is always kept. Returns the number of removed states.
    pub fn prune_unreachable(&mut self, mode: ReachabilityMode) -> usize {
        let reachable = mode.reachable(&self.transitions, self.size());
        let removed = report_unreachable(&self.states, &reachable);
        if removed == 0 {
            return 0;
        }
        self.transitions = self.transitions.retain_columns(&reachable);
        self.states = retain(&self.states, &reachable);
        self.outputs = retain(&self.outputs, &reachable);
        debug!("removed {removed} unreachable states, {} remain", self.size());
        removed
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn reachable_labels<'a>(states: &'a [String], reachable: &[bool]) -> Vec<&'a str> {
        states
            .iter()
            .zip(reachable)
            .filter(|(_, r)| **r)
            .map(|(q, _)| q.as_str())
            .collect()
    }

    /// `C` only loops on itself and is never entered, `D` is only entered from the
    /// unreachable `B`. The column-wise relation keeps `D`, a graph search does not.
    fn counterexample() -> MealyMachine {
        MealyMachine::try_from_str(
            ";A;B;C;D
            x;A/0;D/1;C/0;A/1
            y;A/1;B/0;C/1;D/0",
        )
        .unwrap()
    }

    #[test_log::test]
    fn column_wise_pruning() {
        let mut mm = counterexample();
        let before = mm.clone();
        let reachable = ReachabilityMode::ColumnWise.reachable(mm.transitions(), mm.size());
        assert_eq!(reachable, vec![true, false, false, true]);

        assert_eq!(mm.prune_unreachable(ReachabilityMode::ColumnWise), 2);
        assert_eq!(mm.states(), &["A".to_string(), "D".to_string()]);
        assert_eq!(mm.to_rows(), vec![";A;D", "x;A/0;A/1", "y;A/1;D/0"]);

        // every remaining state is reachable under the relation on the original machine
        for q in mm.states() {
            assert!(reachable_labels(before.states(), &reachable).contains(&q.as_str()));
        }
    }

    #[test_log::test]
    fn graph_pruning_differs_from_column_wise() {
        let mut column_wise = counterexample();
        let mut graph = counterexample();
        column_wise.prune_unreachable(ReachabilityMode::ColumnWise);
        graph.prune_unreachable(ReachabilityMode::Graph);

        assert_eq!(graph.size(), 1);
        assert_eq!(graph.to_rows(), vec![";A", "x;A/0", "y;A/1"]);
        assert_ne!(column_wise.size(), graph.size());
        assert!(column_wise.bisimilar(&graph));
    }

    #[test]
    fn pruning_is_noop_when_everything_is_reachable() {
        let mut mm = MooreMachine::try_from_str(
            ";0;1
            ;A;B
            x;B;A",
        )
        .unwrap();
        let before = mm.clone();
        assert_eq!(mm.prune_unreachable(ReachabilityMode::ColumnWise), 0);
        assert_eq!(mm.prune_unreachable(ReachabilityMode::Graph), 0);
        assert_eq!(mm, before);
    }

    #[test]
    fn moore_outputs_follow_pruned_states() {
        let mut mm = MooreMachine::try_from_str(
            ";0;1;2
            ;A;B;C
            x;C;B;A",
        )
        .unwrap();
        assert_eq!(mm.prune_unreachable(ReachabilityMode::Graph), 1);
        assert_eq!(mm.outputs(), &["0".to_string(), "2".to_string()]);
        assert_eq!(mm.to_rows(), vec![";0;2", ";A;C", "x;C;A"]);
    }

    #[test]
    fn reachability_modes_parse() {
        assert_eq!("graph".parse(), Ok(ReachabilityMode::Graph));
        assert_eq!("column-wise".parse(), Ok(ReachabilityMode::ColumnWise));
        assert!("bfs".parse::<ReachabilityMode>().is_err());
    }
}
