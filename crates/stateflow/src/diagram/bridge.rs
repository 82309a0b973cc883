//! Diagram construction from a state model

use tracing::debug;

use super::database::FlowDiagram;
use crate::core::Database;
use crate::model::StateModel;

impl FlowDiagram {
    /// Build the diagram of a model's transitions
    ///
    /// Node ids and labels are canonical stage text. A transition marked
    /// `!` or `?` with a pending stage and a fallback becomes an approval
    /// step; anything else is a plain edge, even with `via` / `else`.
    pub fn from_model(model: &StateModel) -> Self {
        let mut diagram = Self::new();
        if !model.name().is_empty() {
            diagram.set_title(model.name());
        }

        let init = model.init_stage().key();
        diagram.add_node(&init, &init);

        for transition in model.transitions() {
            let from = transition.from.key();
            let to = transition.to.key();
            match (&transition.via, &transition.fallback) {
                (Some(via), Some(fallback)) if transition.needs_approval() => {
                    diagram.add_approval_transition(&from, &via.key(), &to, &fallback.key())
                }
                _ => diagram.add_direct_transition(&from, &to),
            }
        }

        debug!(
            nodes = diagram.node_count(),
            transitions = model.transitions().len(),
            "Built diagram from model"
        );
        diagram
    }
}
