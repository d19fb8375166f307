//! ## wavestream-core::command
//! **Operator keystroke interpreter**
//!
//! Keys are interpreted against the current [`Selection`] into an [`Action`].
//! Selection changes and scenario switches are applied here; reset, report and
//! quit need the transport or the loop itself and are left to the scheduler.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::node::{NodeId, NodeRegistry, NodeState};
use crate::scenario::{Scenario, ScenarioStore};

/// One operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    /// Ctrl+C while the terminal is in raw mode.
    Interrupt,
}

/// Target of the next scenario switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Node(NodeId),
}

impl Selection {
    pub fn includes(&self, id: NodeId) -> bool {
        match self {
            Selection::All => true,
            Selection::Node(selected) => *selected == id,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("ALL"),
            Selection::Node(id) => write!(f, "Node {id}"),
        }
    }
}

/// A key bound to a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioKey {
    pub key: char,
    pub scenario: &'static str,
    pub label: &'static str,
}

/// Scenario switch bindings.
pub const SCENARIO_KEYS: [ScenarioKey; 5] = [
    ScenarioKey {
        key: 'b',
        scenario: "base",
        label: "BASE",
    },
    ScenarioKey {
        key: 's',
        scenario: "t1",
        label: "SAG",
    },
    ScenarioKey {
        key: 'w',
        scenario: "t2",
        label: "SWELL",
    },
    ScenarioKey {
        key: 'm',
        scenario: "t3",
        label: "MIXED",
    },
    ScenarioKey {
        key: 'o',
        scenario: "oc",
        label: "OVERCURRENT",
    },
];

/// Display label of a scenario, falling back to its upper-cased name.
pub fn scenario_label(name: &str) -> String {
    SCENARIO_KEYS
        .iter()
        .find(|binding| binding.scenario == name)
        .map(|binding| binding.label.to_string())
        .unwrap_or_else(|| name.to_uppercase())
}

/// Result of interpreting one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Unbound key, unknown node or unavailable scenario.
    None,
    Select(Selection),
    Switch {
        selection: Selection,
        scenario: Arc<Scenario>,
    },
    Reset,
    Report,
    Quit,
    Interrupt,
}

/// Keystroke state machine. Its only state is the current selection.
#[derive(Debug, Default, Clone)]
pub struct CommandInterpreter {
    selection: Selection,
}

impl CommandInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Maps a key to an action without changing any state.
    pub fn interpret(
        &self,
        key: KeyInput,
        registry: &NodeRegistry,
        store: &ScenarioStore,
    ) -> Action {
        let key = match key {
            KeyInput::Interrupt => return Action::Interrupt,
            KeyInput::Char(c) => c,
        };

        match key {
            'a' => Action::Select(Selection::All),
            'r' => Action::Reset,
            'p' => Action::Report,
            'q' => Action::Quit,
            digit if digit.is_ascii_digit() => digit
                .to_digit(10)
                .and_then(|d| NodeId::try_from(d).ok())
                .filter(|id| registry.contains(*id))
                .map_or(Action::None, |id| Action::Select(Selection::Node(id))),
            other => SCENARIO_KEYS
                .iter()
                .find(|binding| binding.key == other)
                .and_then(|binding| store.get(binding.scenario))
                .map_or(Action::None, |scenario| Action::Switch {
                    selection: self.selection,
                    scenario,
                }),
        }
    }

    /// Interprets `key` and applies selection changes and scenario switches.
    pub fn dispatch(
        &mut self,
        key: KeyInput,
        nodes: &mut [NodeState],
        registry: &NodeRegistry,
        store: &ScenarioStore,
    ) -> Action {
        let action = self.interpret(key, registry, store);
        match &action {
            Action::Select(selection) => self.selection = *selection,
            Action::Switch {
                selection,
                scenario,
            } => {
                let switched = switch_scenario(nodes, *selection, scenario);
                debug!(%selection, scenario = scenario.name(), switched, "Applied scenario switch");
            }
            _ => {}
        }
        action
    }
}

/// Points every selected node at `scenario` from its first sample.
/// Returns how many nodes were switched.
pub fn switch_scenario(
    nodes: &mut [NodeState],
    selection: Selection,
    scenario: &Arc<Scenario>,
) -> usize {
    let mut switched = 0;
    for node in nodes.iter_mut().filter(|node| selection.includes(node.id())) {
        node.switch_to(Arc::clone(scenario));
        switched += 1;
    }
    switched
}

/// Key reference printed before streaming starts.
pub fn controls_help(registry: &NodeRegistry, store: &ScenarioStore) -> String {
    let ids = registry
        .ids()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        "===== CONTROLS =====".to_string(),
        "  a        select all nodes".to_string(),
        format!("  <digit>  select one node ({ids})"),
    ];
    for binding in &SCENARIO_KEYS {
        let availability = if store.contains(binding.scenario) {
            ""
        } else {
            " [not loaded]"
        };
        lines.push(format!(
            "  {}        {:<12} {}{availability}",
            binding.key, binding.label, binding.scenario
        ));
    }
    lines.extend([
        "  r        reset nodes and restart playback".to_string(),
        "  p        print status".to_string(),
        "  q        quit".to_string(),
        "====================".to_string(),
    ]);
    lines.join("\n")
}

/// Restarts every node's current scenario.
pub fn rewind_all(nodes: &mut [NodeState]) {
    nodes.iter_mut().for_each(NodeState::rewind);
}
