//! Model builder
//!
//! Two passes over the rule set: the first collects the phase and status
//! vocabulary, the second expands wildcard sources and resolves each
//! target into a [`Transition`]. The result is validated before it is
//! returned.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, info_span, trace};

use super::{validate_model, Stage, StateModel, Transition};
use crate::core::Result;
use crate::directive::{Config, FlowRule, RuleSet, StateRef, TargetRef};

/// Build and validate the model for a parsed directive block
pub fn build_model(rule_set: &RuleSet) -> Result<StateModel> {
    build_model_from(&rule_set.config, &rule_set.rules)
}

/// Build and validate a model from a header and its rules
pub fn build_model_from(config: &Config, rules: &[FlowRule]) -> Result<StateModel> {
    let span = info_span!("build_model", name = %config.name, rules = rules.len());
    let _enter = span.enter();

    let vocabulary = Vocabulary::collect(rules);
    let transitions = expand(rules, &vocabulary.statuses);
    let init_stage = rules
        .first()
        .map(|rule| Stage::from_source(&rule.source))
        .unwrap_or_default();

    let model = vocabulary.into_model(config.name.clone(), transitions, init_stage);
    validate_model(&model)?;

    info!(
        phases = model.phases.len(),
        transitions = model.transitions.len(),
        init = %model.init_stage,
        "Built state model"
    );
    Ok(model)
}

/// Phase and status names seen across a rule set
#[derive(Debug, Default)]
struct Vocabulary {
    phases: IndexSet<String>,
    statuses: IndexMap<String, Vec<String>>,
    /// Phases used as a source, target or `else` stage
    regular: IndexSet<String>,
    /// Phases used as a `via` stage
    via: BTreeSet<String>,
    has_approval: bool,
}

impl Vocabulary {
    fn collect(rules: &[FlowRule]) -> Self {
        let mut vocabulary = Self::default();

        for rule in rules {
            let source = &rule.source;
            vocabulary.record(&source.phase, source.status.as_deref().filter(|_| !source.wildcard));
            vocabulary.regular.insert(source.phase.clone());

            for target in &rule.targets {
                let phase = match (&target.phase, target.self_ref) {
                    (Some(phase), false) => phase.as_str(),
                    _ => source.phase.as_str(),
                };
                vocabulary.record(phase, target.status.as_deref());
                vocabulary.regular.insert(phase.to_string());

                if let Some(via) = &target.via {
                    vocabulary.record(&via.phase, via.status.as_deref());
                    vocabulary.via.insert(via.phase.clone());
                }
                if let Some(fallback) = &target.else_ {
                    vocabulary.record(&fallback.phase, fallback.status.as_deref());
                    vocabulary.regular.insert(fallback.phase.clone());
                }
                vocabulary.has_approval |= target.approval.is_set();
            }
        }

        for statuses in vocabulary.statuses.values_mut() {
            statuses.sort();
            statuses.dedup();
        }

        trace!(
            phases = vocabulary.phases.len(),
            via = vocabulary.via.len(),
            "Collected vocabulary"
        );
        vocabulary
    }

    fn record(&mut self, phase: &str, status: Option<&str>) {
        self.phases.insert(phase.to_string());
        let statuses = self.statuses.entry(phase.to_string()).or_default();
        if let Some(status) = status {
            statuses.push(status.to_string());
        }
    }

    fn into_model(self, name: String, transitions: Vec<Transition>, init_stage: Stage) -> StateModel {
        let via_phases = self
            .via
            .into_iter()
            .filter(|phase| !self.regular.contains(phase))
            .collect();
        let has_status = self.statuses.values().any(|s| !s.is_empty());

        StateModel {
            name,
            phases: self.phases.into_iter().collect(),
            statuses: self.statuses,
            has_status,
            has_approval: self.has_approval,
            transitions,
            init_stage,
            via_phases,
        }
    }
}

/// Concrete stages named by a rule source
///
/// A wildcard yields one stage per known status of its phase, or the bare
/// phase when it has none.
fn expand_source(source: &StateRef, statuses: &IndexMap<String, Vec<String>>) -> Vec<Stage> {
    if !source.wildcard {
        return vec![Stage::from_source(source)];
    }

    match statuses.get(&source.phase) {
        Some(known) if !known.is_empty() => known
            .iter()
            .map(|status| Stage::with_status(source.phase.as_str(), status.as_str()))
            .collect(),
        _ => vec![Stage::new(source.phase.as_str())],
    }
}

fn resolve_target(source: &Stage, target: &TargetRef) -> Stage {
    if target.self_ref {
        return source.clone();
    }
    Stage {
        phase: target.phase.clone().unwrap_or_else(|| source.phase.clone()),
        status: target.status.clone(),
    }
}

fn expand(rules: &[FlowRule], statuses: &IndexMap<String, Vec<String>>) -> Vec<Transition> {
    let mut transitions = Vec::new();

    for rule in rules {
        for source in expand_source(&rule.source, statuses) {
            for target in &rule.targets {
                let to = resolve_target(&source, target);

                // Wildcard expansion must not invent self-loops the author never wrote
                if rule.source.wildcard && to == source && !target.self_ref {
                    trace!(stage = %source, "Skipping wildcard self-loop");
                    continue;
                }

                let fallback = match &target.else_ {
                    Some(fallback) => Some(Stage::from(fallback)),
                    None if target.approval.is_set() => Some(source.clone()),
                    None => None,
                };

                transitions.push(Transition {
                    from: source.clone(),
                    to,
                    approval_required: target.approval_required(),
                    approval_optional: target.approval_optional(),
                    via: target.via.as_ref().map(Stage::from),
                    fallback,
                });
            }
        }
    }

    debug!(count = transitions.len(), "Expanded transitions");
    transitions
}
