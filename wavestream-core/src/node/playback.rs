//! Per-node playback cursor.
//!
//! The cursor and the scenario it points into are only ever changed together,
//! so `index` is always a valid offset into the node's current scenario.

use std::sync::Arc;

use super::NodeId;
use crate::scenario::{Sample, Scenario};

/// Playback position within a scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub cycle_count: u64,
}

/// What a single [`NodeState::advance`] did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next sample inside the current cycle.
    Stepped,
    /// Crossed a cycle boundary.
    CycleCompleted,
    /// Ran off the end of the recording and restarted at the first sample.
    Wrapped,
}

/// Mutable playback state of one node.
#[derive(Debug, Clone)]
pub struct NodeState {
    id: NodeId,
    scenario: Arc<Scenario>,
    cursor: Cursor,
}

impl NodeState {
    pub fn new(id: NodeId, scenario: Arc<Scenario>) -> Self {
        Self {
            id,
            scenario,
            cursor: Cursor::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn scenario(&self) -> &Arc<Scenario> {
        &self.scenario
    }

    pub fn scenario_name(&self) -> &str {
        self.scenario.name()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn index(&self) -> usize {
        self.cursor.index
    }

    pub fn cycle_count(&self) -> u64 {
        self.cursor.cycle_count
    }

    /// Sample under the cursor.
    pub fn current_sample(&self) -> Sample {
        self.scenario.samples()[self.cursor.index]
    }

    /// Moves to the next sample, counting cycles and looping at the end.
    pub fn advance(&mut self, cycle_length: usize) -> Advance {
        self.cursor.index += 1;

        let mut outcome = Advance::Stepped;
        if cycle_length > 0 && self.cursor.index % cycle_length == 0 {
            self.cursor.cycle_count += 1;
            outcome = Advance::CycleCompleted;
        }
        if self.cursor.index >= self.scenario.len() {
            self.cursor = Cursor::default();
            outcome = Advance::Wrapped;
        }
        outcome
    }

    /// Plays `scenario` from its first sample.
    pub fn switch_to(&mut self, scenario: Arc<Scenario>) {
        self.scenario = scenario;
        self.cursor = Cursor::default();
    }

    /// Restarts the current scenario.
    pub fn rewind(&mut self) {
        self.cursor = Cursor::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario(name: &str, len: usize) -> Arc<Scenario> {
        let samples = (0..len).map(|i| Sample::new(i as f64, -(i as f64))).collect();
        Arc::new(Scenario::new(name, samples).unwrap())
    }

    #[test]
    fn reads_sample_under_cursor() {
        let mut node = NodeState::new(1, scenario("base", 4));
        assert_eq!(node.current_sample(), Sample::new(0.0, 0.0));
        node.advance(60);
        assert_eq!(node.current_sample(), Sample::new(1.0, -1.0));
    }

    #[test]
    fn counts_cycles_and_wraps() {
        let mut node = NodeState::new(1, scenario("base", 120));
        for _ in 0..59 {
            assert_eq!(node.advance(60), Advance::Stepped);
        }
        assert_eq!(node.advance(60), Advance::CycleCompleted);
        assert_eq!(node.cursor(), Cursor { index: 60, cycle_count: 1 });

        for _ in 0..59 {
            node.advance(60);
        }
        assert_eq!(node.advance(60), Advance::Wrapped);
        assert_eq!(node.cursor(), Cursor::default());
    }

    #[test]
    fn switch_resets_cursor_with_scenario() {
        let mut node = NodeState::new(2, scenario("base", 120));
        for _ in 0..90 {
            node.advance(60);
        }
        node.switch_to(scenario("oc", 60));
        assert_eq!(node.scenario_name(), "oc");
        assert_eq!(node.cursor(), Cursor::default());
    }

    #[test]
    fn rewind_keeps_scenario() {
        let mut node = NodeState::new(3, scenario("t1", 30));
        node.advance(10);
        node.rewind();
        assert_eq!(node.scenario_name(), "t1");
        assert_eq!(node.index(), 0);
    }

    proptest! {
        #[test]
        fn index_advances_modulo_length(len in 1usize..500, cycle in 1usize..100, steps in 0usize..2000) {
            let mut node = NodeState::new(1, scenario("base", len));
            for _ in 0..steps {
                let before = node.cursor();
                let outcome = node.advance(cycle);
                let after = node.cursor();

                prop_assert_eq!(after.index, (before.index + 1) % len);
                prop_assert!(after.index < len);
                match outcome {
                    Advance::Wrapped => prop_assert_eq!(after.cycle_count, 0),
                    Advance::CycleCompleted => {
                        prop_assert_eq!(after.cycle_count, before.cycle_count + 1);
                        prop_assert_eq!(after.index % cycle, 0);
                    }
                    Advance::Stepped => prop_assert_eq!(after.cycle_count, before.cycle_count),
                }
            }
        }

        #[test]
        fn cycle_count_matches_position(len in 1usize..500, cycle in 1usize..100, steps in 0usize..2000) {
            let mut node = NodeState::new(1, scenario("base", len));
            for _ in 0..steps {
                node.advance(cycle);
            }
            let cursor = node.cursor();
            prop_assert_eq!(cursor.index, steps % len);
            prop_assert_eq!(cursor.cycle_count, (cursor.index / cycle) as u64);
        }
    }
}
