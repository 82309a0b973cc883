//! The immutable state model handed to renderers and emitters

use indexmap::IndexMap;

use super::{Stage, Transition};

/// A validated state machine built from one directive block
///
/// Instances come only from [`build_model`](super::build_model), so every
/// model seen by callers has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateModel {
    pub(crate) name: String,
    pub(crate) phases: Vec<String>,
    pub(crate) statuses: IndexMap<String, Vec<String>>,
    pub(crate) has_status: bool,
    pub(crate) has_approval: bool,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) init_stage: Stage,
    pub(crate) via_phases: Vec<String>,
}

impl StateModel {
    /// Name from the `@StateFlow` header; empty when none was given
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase names in first-seen order
    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    /// Sorted, distinct statuses of `phase`
    pub fn statuses(&self, phase: &str) -> &[String] {
        self.statuses.get(phase).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every phase with its statuses, in phase order
    pub fn status_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.statuses
    }

    pub fn has_status(&self) -> bool {
        self.has_status
    }

    pub fn has_approval(&self) -> bool {
        self.has_approval
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn init_stage(&self) -> &Stage {
        &self.init_stage
    }

    /// Sorted phases that only ever appear as `via` stages
    pub fn via_phases(&self) -> &[String] {
        &self.via_phases
    }

    pub fn is_via_phase(&self, phase: &str) -> bool {
        self.via_phases.binary_search_by(|p| p.as_str().cmp(phase)).is_ok()
    }

    /// Every stage in phase-then-status order
    ///
    /// A phase without statuses contributes a single status-less stage.
    pub fn all_stages(&self) -> Vec<Stage> {
        self.phases
            .iter()
            .flat_map(|phase| {
                let statuses = self.statuses(phase);
                if statuses.is_empty() {
                    vec![Stage::new(phase.as_str())]
                } else {
                    statuses
                        .iter()
                        .map(|status| Stage::with_status(phase.as_str(), status.as_str()))
                        .collect()
                }
            })
            .collect()
    }

    /// Transitions leaving exactly `stage`, in declaration order
    pub fn transitions_from(&self, stage: &Stage) -> impl Iterator<Item = &Transition> + '_ {
        let stage = stage.clone();
        self.transitions.iter().filter(move |t| t.from == stage)
    }

    /// Distinct destinations reachable in one step from `stage`
    pub fn valid_targets(&self, stage: &Stage) -> Vec<&Stage> {
        let mut seen = std::collections::HashSet::new();
        self.transitions_from(stage)
            .map(|t| &t.to)
            .filter(|to| seen.insert(to.key()))
            .collect()
    }
}
