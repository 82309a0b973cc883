//! Stateflow - compile `@StateFlow` directives into state models and ASCII flow diagrams
//!
//! A workflow is described in a comment block with one `@StateFlow` header
//! and any number of `@Flow:` rules. This crate parses the block, builds
//! and validates the state machine, and renders it as a flow diagram.
//!
//! # Quick Start
//!
//! ```rust
//! use stateflow::render;
//!
//! let input = "@StateFlow(name=Job)\n@Flow: Queued => [ Running ]\n@Flow: Running => [ Done ]";
//! let ascii = render(input).unwrap();
//! assert_eq!(ascii, "Queued --> Running --> Done");
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use stateflow::prelude::*;
//!
//! let input = "@StateFlow(name=Doc)\n@Flow: Draft => [ Published! via Reviewing ]";
//!
//! // Parse into a rule set
//! let rule_set = parse_all(input).unwrap();
//! assert_eq!(rule_set.rules.len(), 1);
//!
//! // Build and validate the model
//! let model = build_model(&rule_set).unwrap();
//! assert_eq!(model.via_phases(), ["Reviewing"]);
//!
//! // Render to ASCII
//! let diagram = FlowDiagram::from_model(&model);
//! let ascii = FlowRenderer::new().render(&diagram).unwrap();
//! assert!(ascii.contains("Draft --> Reviewing (via)"));
//! ```

pub mod core;
pub mod diagram;
pub mod directive;
pub mod model;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{CharacterSet, Database, Renderer, StateFlowError, Symbols};
    pub use crate::diagram::{DiagramEdge, DiagramNode, FlowDiagram, FlowRenderer, NodeConfig};
    pub use crate::directive::{
        parse_all, parse_config, parse_rule, Config, FlowRule, RuleSet, StateRef, TargetRef,
    };
    pub use crate::model::{build_model, build_model_from, Stage, StateModel, Transition};
}

/// Parse a directive block into a rule set without building a model
///
/// # Example
/// ```rust
/// let rule_set = stateflow::parse("@StateFlow(name=Job)\n@Flow: Queued => [ Done ]").unwrap();
/// assert_eq!(rule_set.config.name, "Job");
/// assert_eq!(rule_set.rules.len(), 1);
/// ```
pub fn parse(input: &str) -> anyhow::Result<directive::RuleSet> {
    Ok(directive::parse_all(input)?)
}

/// Parse a directive block and build its validated state model
///
/// # Example
/// ```rust
/// let model = stateflow::build("@StateFlow\n@Flow: A => [ B ]").unwrap();
/// assert_eq!(model.phases(), ["A", "B"]);
/// ```
pub fn build(input: &str) -> anyhow::Result<model::StateModel> {
    let rule_set = directive::parse_all(input)?;
    Ok(model::build_model(&rule_set)?)
}

/// Render a directive block as an ASCII flow diagram
///
/// This is the simplest way to go from directive text to a diagram.
/// Uses the ASCII character set.
///
/// # Returns
/// * `Ok(String)` - The diagram
/// * `Err` - If parsing or validation fails
pub fn render(input: &str) -> anyhow::Result<String> {
    render_with_style(input, CharacterSet::default())
}

/// Render a directive block with a specific character set
///
/// # Example
/// ```rust
/// use stateflow::{render_with_style, CharacterSet};
///
/// let text = "@StateFlow\n@Flow: A => [ B, C ]";
/// let unicode = render_with_style(text, CharacterSet::Unicode).unwrap();
/// assert!(unicode.contains('┌'));
/// ```
pub fn render_with_style(input: &str, style: CharacterSet) -> anyhow::Result<String> {
    let model = build(input)?;
    Ok(render_model(&model, style))
}

/// Render an already built model with a specific character set
pub fn render_model(model: &model::StateModel, style: CharacterSet) -> String {
    let diagram = diagram::FlowDiagram::from_model(model);
    diagram::FlowRenderer::with_style(style).render_diagram(&diagram)
}

/// Render a directive block as a fenced `//` comment
///
/// The title is the workflow name, or `State Flow` when none is given.
pub fn render_comment(input: &str) -> anyhow::Result<String> {
    let model = build(input)?;
    Ok(diagram::FlowDiagram::from_model(&model).render_as_comment())
}
