//! Resolved stages and transitions

use std::fmt;

use crate::directive::{StageRef, StateRef};

/// A resolved `(phase, status)` pair; the node identity of the state graph
///
/// Ordering is phase first, then status, with a missing status sorting
/// before any concrete one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stage {
    pub phase: String,
    pub status: Option<String>,
}

impl Stage {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            status: None,
        }
    }

    pub fn with_status(phase: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            status: Some(status.into()),
        }
    }

    /// Stage named by a rule source; the wildcard marker is dropped
    pub fn from_source(source: &StateRef) -> Self {
        Self {
            phase: source.phase.clone(),
            status: if source.wildcard {
                None
            } else {
                source.status.clone()
            },
        }
    }

    /// Canonical text: `Phase` or `Phase(Status)`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl From<&StageRef> for Stage {
    fn from(stage: &StageRef) -> Self {
        Self {
            phase: stage.phase.clone(),
            status: stage.status.clone(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{}({})", self.phase, status),
            None => write!(f, "{}", self.phase),
        }
    }
}

/// A fully resolved directed edge of the state graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Stage,
    pub to: Stage,
    pub approval_required: bool,
    pub approval_optional: bool,
    /// Pending stage between `from` and `to`
    pub via: Option<Stage>,
    /// Stage reached when the pending approval is rejected
    pub fallback: Option<Stage>,
}

impl Transition {
    /// A plain edge with no approval step
    pub fn direct(from: Stage, to: Stage) -> Self {
        Self {
            from,
            to,
            approval_required: false,
            approval_optional: false,
            via: None,
            fallback: None,
        }
    }

    pub fn needs_approval(&self) -> bool {
        self.approval_required || self.approval_optional
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)?;
        if self.approval_required {
            write!(f, " !")?;
        } else if self.approval_optional {
            write!(f, " ?")?;
        }
        if let Some(via) = &self.via {
            write!(f, " via {}", via)?;
        }
        if let Some(fallback) = &self.fallback {
            write!(f, " else {}", fallback)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_canonical_text() {
        assert_eq!(Stage::new("Init").key(), "Init");
        assert_eq!(Stage::with_status("Ready", "Enabled").key(), "Ready(Enabled)");
    }

    #[test]
    fn test_stage_equality_is_exact() {
        assert_ne!(Stage::new("Ready"), Stage::with_status("Ready", "Enabled"));
        assert_eq!(
            Stage::with_status("Ready", "Enabled"),
            Stage::with_status("Ready", "Enabled")
        );
    }

    #[test]
    fn test_stage_ordering() {
        let mut stages = vec![
            Stage::with_status("Ready", "Enabled"),
            Stage::new("Ready"),
            Stage::with_status("Ready", "Disabled"),
            Stage::new("Failed"),
        ];
        stages.sort();
        let keys: Vec<String> = stages.iter().map(Stage::key).collect();
        assert_eq!(
            keys,
            vec!["Failed", "Ready", "Ready(Disabled)", "Ready(Enabled)"]
        );
    }

    #[test]
    fn test_from_wildcard_source_drops_marker() {
        assert_eq!(Stage::from_source(&StateRef::wildcard("Ready")), Stage::new("Ready"));
        assert_eq!(
            Stage::from_source(&StateRef::with_status("Ready", "Enabled")),
            Stage::with_status("Ready", "Enabled")
        );
    }

    #[test]
    fn test_transition_display() {
        let mut transition = Transition::direct(Stage::new("Draft"), Stage::new("Published"));
        assert_eq!(transition.to_string(), "Draft -> Published");

        transition.approval_required = true;
        transition.via = Some(Stage::new("Reviewing"));
        transition.fallback = Some(Stage::new("Draft"));
        assert_eq!(
            transition.to_string(),
            "Draft -> Published ! via Reviewing else Draft"
        );
        assert!(transition.needs_approval());
    }
}
