//! Core error types for directive processing
//!
//! Every failure in the parse → build → render pipeline is fatal for the
//! directive block it came from. Syntax and semantic errors carry the
//! offending directive line, graph errors carry the canonical stage text.

use thiserror::Error;

/// Result alias used by the parser, model builder and renderer
pub type Result<T> = std::result::Result<T, StateFlowError>;

/// Errors raised while compiling a `@StateFlow` directive block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateFlowError {
    #[error("Malformed directive: {message}: `{line}`")]
    MalformedDirective { message: String, line: String },

    #[error("Unmatched parenthesis in `{line}`")]
    UnmatchedParenthesis { line: String },

    #[error("Missing `[...]` target list in `{line}`")]
    MissingTargetList { line: String },

    #[error("Empty `[]` target list in `{line}`")]
    EmptyTargetList { line: String },

    #[error("Empty state reference in `{line}`")]
    EmptyStateRef { line: String },

    #[error("Approval mark `{mark}` requires a `via` clause in `{line}`")]
    ApprovalWithoutVia { mark: char, line: String },

    #[error("Duplicate @StateFlow directive: `{line}`")]
    DuplicateConfig { line: String },

    #[error("No @StateFlow directive found")]
    MissingConfig,

    #[error("State flow declares no phases")]
    NoPhases,

    #[error("State flow declares {phases} phases but no transitions")]
    NoTransitions { phases: usize },

    #[error("Isolated node: stage `{stage}` has no inbound or outbound transitions")]
    IsolatedNode { stage: String },

    #[error("Disconnected subgraph: stage `{stage}` is not reachable from the initial stage")]
    DisconnectedSubgraph { stage: String },

    #[error("Unreachable terminal: stage `{stage}` is never reached from the initial stage")]
    UnreachableTerminal { stage: String },
}

impl StateFlowError {
    /// Create a new malformed-directive error
    pub fn malformed(message: impl Into<String>, line: &str) -> Self {
        Self::MalformedDirective {
            message: message.into(),
            line: line.to_string(),
        }
    }

    pub fn unmatched_parenthesis(line: &str) -> Self {
        Self::UnmatchedParenthesis {
            line: line.to_string(),
        }
    }

    pub fn empty_state_ref(line: &str) -> Self {
        Self::EmptyStateRef {
            line: line.to_string(),
        }
    }

    /// Returns true for errors produced by model validation
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::NoPhases
                | Self::NoTransitions { .. }
                | Self::IsolatedNode { .. }
                | Self::DisconnectedSubgraph { .. }
                | Self::UnreachableTerminal { .. }
        )
    }
}
