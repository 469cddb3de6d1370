//! Guard analysis over whole FSM transition lists.
//!
//! Transitions are grouped by source state and event. Within a group, any
//! two guards that can hold together make the machine non-deterministic, and
//! an input on which no guard holds is a potential local deadlock.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug_span, info};

use crate::{Analyzer, EfsmVariable, FieldCondition, Guard};

/// Label reported for transitions without an event.
pub const EMPTY_EVENT: &str = "(empty)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Initial,
    Normal,
    Final,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<NodeKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsmNode {
    pub id: String,
    #[serde(default)]
    pub data: Option<NodeData>,
}

impl FsmNode {
    fn kind(&self) -> Option<NodeKind> {
        self.data.as_ref().and_then(|d| d.kind)
    }

    fn label(&self) -> String {
        self.data
            .as_ref()
            .and_then(|d| d.label.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Payload of an FSM edge as stored by the editor.
///
/// `condition` is kept as raw JSON because editors have stored it in several
/// shapes; [`edge_guard`] decodes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub condition: Option<Value>,
    #[serde(default)]
    pub action: Option<Value>,
    #[serde(default)]
    pub use_protocol_conditions: Option<bool>,
    #[serde(default)]
    pub protocol_conditions: Option<Vec<FieldCondition>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsmEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub data: Option<EdgeData>,
}

impl FsmEdge {
    fn event(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.event.as_deref())
            .unwrap_or("")
    }

    #[must_use]
    pub fn guard(&self) -> Guard {
        self.data.as_ref().map_or(Guard::AlwaysTrue, edge_guard)
    }
}

/// A whole machine as submitted for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsmDefinition {
    #[serde(default)]
    pub nodes: Vec<FsmNode>,
    #[serde(default)]
    pub edges: Vec<FsmEdge>,
    #[serde(default)]
    pub variables: Vec<EfsmVariable>,
}

/// Two transitions leaving `state` on `event` whose guards overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterminismIssue {
    pub state: String,
    pub event: String,
    pub targets: Vec<String>,
    pub guard1: Guard,
    pub guard2: Guard,
    pub counter_example: Option<String>,
}

/// Inputs on which no transition leaving `state` on `event` fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessIssue {
    pub state: String,
    pub event: String,
    pub gap_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRef {
    pub id: String,
    pub label: String,
}

/// Combined result of [`Analyzer::analyze_fsm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsmReport {
    pub determinism: Vec<DeterminismIssue>,
    pub completeness: Vec<CompletenessIssue>,
    pub dead_states: Vec<StateRef>,
    pub unreachable_states: Vec<StateRef>,
}

/// Decode the guard of an edge.
///
/// Recognized shapes, in order: a `{type: "protocol", conditions}` or
/// `{type: "manual", text}` condition object, `use_protocol_conditions`
/// with a non-empty `protocol_conditions` list, a plain condition string.
/// Anything else is always true.
#[must_use]
pub fn edge_guard(data: &EdgeData) -> Guard {
    if let Some(Value::Object(condition)) = &data.condition {
        match condition.get("type").and_then(Value::as_str) {
            Some("protocol") => {
                let conditions = condition
                    .get("conditions")
                    .cloned()
                    .and_then(|v| serde_json::from_value::<Vec<FieldCondition>>(v).ok())
                    .unwrap_or_default();
                if !conditions.is_empty() {
                    return Guard::Protocol(conditions);
                }
            }
            Some("manual") => {
                let text = condition.get("text").and_then(Value::as_str).unwrap_or("");
                if !text.trim().is_empty() {
                    return Guard::manual(text.trim());
                }
            }
            _ => {}
        }
    }

    if data.use_protocol_conditions == Some(true) {
        if let Some(conditions) = data.protocol_conditions.as_ref().filter(|c| !c.is_empty()) {
            return Guard::Protocol(conditions.clone());
        }
    }

    if let Some(Value::String(text)) = &data.condition {
        if !text.trim().is_empty() {
            return Guard::manual(text.trim());
        }
    }

    Guard::AlwaysTrue
}

type EventGroups<'a> = Vec<(&'a str, Vec<(&'a str, Vec<&'a FsmEdge>)>)>;

/// Group edges by source state, then by event, both in first-appearance
/// order.
fn group_transitions(edges: &[FsmEdge]) -> EventGroups<'_> {
    let mut groups: EventGroups<'_> = Vec::new();
    let mut state_index: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        let si = *state_index.entry(edge.source.as_str()).or_insert_with(|| {
            groups.push((edge.source.as_str(), Vec::new()));
            groups.len() - 1
        });
        let events = &mut groups[si].1;
        let event = edge.event();
        match events.iter_mut().find(|(e, _)| *e == event) {
            Some((_, transitions)) => transitions.push(edge),
            None => events.push((event, vec![edge])),
        }
    }
    groups
}

fn event_label(event: &str) -> String {
    if event.is_empty() {
        EMPTY_EVENT.to_owned()
    } else {
        event.to_owned()
    }
}

impl Analyzer {
    /// Report, per (state, event) group, the first pair of transitions whose
    /// guards can hold at once.
    pub fn check_determinism(&self, edges: &[FsmEdge]) -> Vec<DeterminismIssue> {
        let mut issues = Vec::new();
        for (state, events) in group_transitions(edges) {
            for (event, transitions) in events {
                if transitions.len() < 2 {
                    continue;
                }
                let guards: Vec<Guard> = transitions.iter().map(|t| t.guard()).collect();
                'pairs: for i in 0..transitions.len() {
                    for j in i + 1..transitions.len() {
                        let verdict = self.check_guards_satisfiable(&guards[i], &guards[j]);
                        if verdict.satisfiable {
                            info!(
                                state,
                                event,
                                counter_example = verdict.model.as_deref().unwrap_or(""),
                                "non-deterministic transitions"
                            );
                            issues.push(DeterminismIssue {
                                state: state.to_owned(),
                                event: event_label(event),
                                targets: vec![
                                    transitions[i].target.clone(),
                                    transitions[j].target.clone(),
                                ],
                                guard1: guards[i].clone(),
                                guard2: guards[j].clone(),
                                counter_example: verdict.model,
                            });
                            break 'pairs;
                        }
                    }
                }
            }
        }
        issues
    }

    /// Report every (state, event) group whose guards leave a gap in the
    /// domain declared by `variables`.
    pub fn check_completeness(
        &self,
        edges: &[FsmEdge],
        variables: &[EfsmVariable],
    ) -> Vec<CompletenessIssue> {
        let mut issues = Vec::new();
        for (state, events) in group_transitions(edges) {
            for (event, transitions) in events {
                let _span = debug_span!("completeness", state, event).entered();
                let guards: Vec<Guard> = transitions.iter().map(|t| t.guard()).collect();
                let verdict = self.check_guards_complete(&guards, variables);
                if !verdict.complete {
                    info!(
                        gap = verdict.gap_model.as_deref().unwrap_or(""),
                        "incomplete guard coverage"
                    );
                    issues.push(CompletenessIssue {
                        state: state.to_owned(),
                        event: event_label(event),
                        gap_model: verdict.gap_model,
                    });
                }
            }
        }
        issues
    }

    /// Run every check over a whole machine.
    pub fn analyze_fsm(&self, fsm: &FsmDefinition) -> FsmReport {
        FsmReport {
            determinism: self.check_determinism(&fsm.edges),
            completeness: self.check_completeness(&fsm.edges, &fsm.variables),
            dead_states: find_dead_states(&fsm.nodes, &fsm.edges),
            unreachable_states: find_unreachable_states(&fsm.nodes, &fsm.edges),
        }
    }
}

/// Non-final states without outgoing transitions.
#[must_use]
pub fn find_dead_states(nodes: &[FsmNode], edges: &[FsmEdge]) -> Vec<StateRef> {
    let with_outgoing: HashSet<&str> = edges.iter().map(|e| e.source.as_str()).collect();
    nodes
        .iter()
        .filter(|n| n.kind() != Some(NodeKind::Final) && !with_outgoing.contains(n.id.as_str()))
        .map(|n| StateRef {
            id: n.id.clone(),
            label: n.label(),
        })
        .collect()
}

/// States not reachable from any initial state. Without an initial state,
/// every state is unreachable.
#[must_use]
pub fn find_unreachable_states(nodes: &[FsmNode], edges: &[FsmEdge]) -> Vec<StateRef> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut reachable: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for node in nodes.iter().filter(|n| n.kind() == Some(NodeKind::Initial)) {
        if reachable.insert(node.id.as_str()) {
            queue.push_back(node.id.as_str());
        }
    }
    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(current).map(Vec::as_slice).unwrap_or_default() {
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    nodes
        .iter()
        .filter(|n| !reachable.contains(n.id.as_str()))
        .map(|n| StateRef {
            id: n.id.clone(),
            label: n.label(),
        })
        .collect()
}
