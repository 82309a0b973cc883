//! Rule set types produced by the directive parser

use std::fmt;

/// Header parsed from the `@StateFlow(...)` directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Workflow name; empty when the directive carries no `name`
    pub name: String,
    /// Output hint handed through to the emitter
    pub output: Option<String>,
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: None,
        }
    }

    /// The configured name, or `default` when none was given
    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.name.is_empty() {
            default
        } else {
            &self.name
        }
    }
}

/// Source side of a flow rule: `Phase`, `Phase(Status)` or `Phase(*)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRef {
    pub phase: String,
    pub status: Option<String>,
    pub wildcard: bool,
}

impl StateRef {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            status: None,
            wildcard: false,
        }
    }

    pub fn with_status(phase: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            status: Some(status.into()),
            wildcard: false,
        }
    }

    pub fn wildcard(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            status: None,
            wildcard: true,
        }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, self.wildcard) {
            (_, true) => write!(f, "{}(*)", self.phase),
            (Some(status), false) => write!(f, "{}({})", self.phase, status),
            (None, false) => write!(f, "{}", self.phase),
        }
    }
}

/// Stage reference inside a `via` or `else` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRef {
    pub phase: String,
    pub status: Option<String>,
}

impl StageRef {
    pub fn new(phase: impl Into<String>, status: Option<&str>) -> Self {
        Self {
            phase: phase.into(),
            status: status.map(str::to_string),
        }
    }
}

impl fmt::Display for StageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{}({})", self.phase, status),
            None => write!(f, "{}", self.phase),
        }
    }
}

/// Approval requirement attached to a target by a trailing `!` or `?`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Approval {
    #[default]
    None,
    /// `!`: the transition must pass through its `via` stage
    Required,
    /// `?`: the transition may pass through its `via` stage
    Optional,
}

impl Approval {
    /// The directive mark for this approval, if any
    pub fn mark(&self) -> Option<char> {
        match self {
            Approval::None => None,
            Approval::Required => Some('!'),
            Approval::Optional => Some('?'),
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Approval::None)
    }
}

/// Target side of a flow rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRef {
    /// Destination phase; `None` means "same phase as the source"
    pub phase: Option<String>,
    pub status: Option<String>,
    /// `(=)`: stay on the source stage
    pub self_ref: bool,
    pub approval: Approval,
    pub via: Option<StageRef>,
    pub else_: Option<StageRef>,
}

impl TargetRef {
    pub fn phase(phase: impl Into<String>) -> Self {
        Self {
            phase: Some(phase.into()),
            ..Default::default()
        }
    }

    pub fn status_only(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn same() -> Self {
        Self {
            self_ref: true,
            ..Default::default()
        }
    }

    pub fn approval_required(&self) -> bool {
        self.approval == Approval::Required
    }

    pub fn approval_optional(&self) -> bool {
        self.approval == Approval::Optional
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.self_ref {
            write!(f, "(=)")?;
        } else {
            if let Some(phase) = &self.phase {
                write!(f, "{}", phase)?;
            }
            if let Some(status) = &self.status {
                write!(f, "({})", status)?;
            }
        }
        if let Some(mark) = self.approval.mark() {
            write!(f, "{}", mark)?;
        }
        if let Some(via) = &self.via {
            write!(f, " via {}", via)?;
        }
        if let Some(fallback) = &self.else_ {
            write!(f, " else {}", fallback)?;
        }
        Ok(())
    }
}

/// One `@Flow:` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRule {
    pub source: StateRef,
    /// Empty for a standalone node declaration
    pub targets: Vec<TargetRef>,
}

impl fmt::Display for FlowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@Flow: {}", self.source)?;
        if !self.targets.is_empty() {
            let targets: Vec<String> = self.targets.iter().map(|t| t.to_string()).collect();
            write!(f, " => [ {} ]", targets.join(", "))?;
        }
        Ok(())
    }
}

/// A complete directive block: one header plus its flow rules in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub config: Config,
    pub rules: Vec<FlowRule>,
}
