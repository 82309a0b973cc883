//! Structural validation of a built model
//!
//! Every stage that is not purely a `via` intermediate must be reachable
//! from the initial stage. Edges are keyed by canonical stage text.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use tracing::{debug, info_span, trace};

use super::{StateModel, Transition};
use crate::core::{Result, StateFlowError};

/// Directed graph over canonical stage keys
#[derive(Debug, Default)]
struct StageGraph {
    outbound: IndexMap<String, Vec<String>>,
    inbound: HashSet<String>,
}

impl StageGraph {
    fn from_transitions(transitions: &[Transition]) -> Self {
        let mut graph = Self::default();
        for transition in transitions {
            let from = transition.from.key();
            let to = transition.to.key();
            graph.connect(&from, &to);
            if let Some(via) = &transition.via {
                let via = via.key();
                graph.connect(&from, &via);
                graph.connect(&via, &to);
            }
            if let Some(fallback) = &transition.fallback {
                graph.connect(&from, &fallback.key());
            }
        }
        graph
    }

    fn connect(&mut self, from: &str, to: &str) {
        self.outbound
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.inbound.insert(to.to_string());
    }

    fn has_outbound(&self, key: &str) -> bool {
        self.outbound.get(key).is_some_and(|targets| !targets.is_empty())
    }

    fn has_inbound(&self, key: &str) -> bool {
        self.inbound.contains(key)
    }

    /// Breadth-first walk from `start`, returning every key reached
    fn reachable_from(&self, start: &str) -> HashSet<String> {
        let mut reached = HashSet::from([start.to_string()]);
        let mut queue = VecDeque::from([start.to_string()]);

        while let Some(key) = queue.pop_front() {
            for next in self.outbound.get(&key).into_iter().flatten() {
                if reached.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
        reached
    }
}

/// Check the connectivity invariants of a model
pub fn validate_model(model: &StateModel) -> Result<()> {
    let span = info_span!("validate_model", phases = model.phases.len());
    let _enter = span.enter();

    if model.phases.is_empty() {
        return Err(StateFlowError::NoPhases);
    }

    if model.transitions.is_empty() {
        if model.phases.len() > 1 {
            return Err(StateFlowError::NoTransitions {
                phases: model.phases.len(),
            });
        }
        debug!("Single-phase model without transitions");
        return Ok(());
    }

    let graph = StageGraph::from_transitions(&model.transitions);
    let reached = graph.reachable_from(&model.init_stage.key());
    debug!(reached = reached.len(), init = %model.init_stage, "Reachability computed");

    for stage in model.all_stages() {
        if model.is_via_phase(&stage.phase) {
            continue;
        }

        let key = stage.key();
        let inbound = graph.has_inbound(&key);
        let outbound = graph.has_outbound(&key);
        trace!(stage = %key, inbound, outbound, reached = reached.contains(&key), "Checking stage");

        if !inbound && !outbound {
            return Err(StateFlowError::IsolatedNode { stage: key });
        }
        if reached.contains(&key) {
            continue;
        }
        if outbound {
            return Err(StateFlowError::DisconnectedSubgraph { stage: key });
        }
        return Err(StateFlowError::UnreachableTerminal { stage: key });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stage;

    fn model(phases: &[&str], transitions: Vec<Transition>, init: &str) -> StateModel {
        StateModel {
            name: String::new(),
            phases: phases.iter().map(|p| p.to_string()).collect(),
            statuses: phases.iter().map(|p| (p.to_string(), vec![])).collect(),
            has_status: false,
            has_approval: false,
            transitions,
            init_stage: Stage::new(init),
            via_phases: vec![],
        }
    }

    fn edge(from: &str, to: &str) -> Transition {
        Transition::direct(Stage::new(from), Stage::new(to))
    }

    #[test]
    fn test_no_phases() {
        assert_eq!(
            validate_model(&model(&[], vec![], "")),
            Err(StateFlowError::NoPhases)
        );
    }

    #[test]
    fn test_no_transitions() {
        assert_eq!(
            validate_model(&model(&["A", "B"], vec![], "A")),
            Err(StateFlowError::NoTransitions { phases: 2 })
        );
        assert_eq!(validate_model(&model(&["A"], vec![], "A")), Ok(()));
    }

    #[test]
    fn test_isolated_node() {
        assert_eq!(
            validate_model(&model(&["A", "B", "C"], vec![edge("A", "B")], "A")),
            Err(StateFlowError::IsolatedNode {
                stage: "C".to_string()
            })
        );
    }

    #[test]
    fn test_disconnected_subgraph() {
        assert_eq!(
            validate_model(&model(
                &["A", "B", "C", "D"],
                vec![edge("A", "B"), edge("C", "D")],
                "A"
            )),
            Err(StateFlowError::DisconnectedSubgraph {
                stage: "C".to_string()
            })
        );
    }

    #[test]
    fn test_unreachable_terminal() {
        // C only receives an edge from a via-only stage that nothing enters
        let mut m = model(&["A", "B", "C", "V"], vec![edge("A", "B"), edge("V", "C")], "A");
        m.via_phases = vec!["V".to_string()];
        assert_eq!(
            validate_model(&m),
            Err(StateFlowError::UnreachableTerminal {
                stage: "C".to_string()
            })
        );
    }

    #[test]
    fn test_via_hops_reach_target() {
        let mut transition = edge("A", "B");
        transition.via = Some(Stage::new("V"));
        transition.fallback = Some(Stage::new("A"));
        let mut m = model(&["A", "B", "V"], vec![transition], "A");
        m.via_phases = vec!["V".to_string()];
        assert_eq!(validate_model(&m), Ok(()));
    }

    #[test]
    fn test_fallback_edge_counts_for_reachability() {
        let mut transition = edge("A", "B");
        transition.via = Some(Stage::new("V"));
        transition.fallback = Some(Stage::new("F"));
        let mut m = model(&["A", "B", "V", "F"], vec![transition, edge("F", "A")], "A");
        m.via_phases = vec!["V".to_string()];
        assert_eq!(validate_model(&m), Ok(()));
    }

    #[test]
    fn test_cycle_is_valid() {
        assert_eq!(
            validate_model(&model(&["A", "B"], vec![edge("A", "B"), edge("B", "A")], "A")),
            Ok(())
        );
    }
}
