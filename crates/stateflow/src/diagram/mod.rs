//! Flow diagram
//!
//! A small directed graph ([`FlowDiagram`]) and its ASCII renderer
//! ([`FlowRenderer`]). Diagrams are built by hand or from a
//! [`StateModel`](crate::model::StateModel).

mod bridge;
mod database;
mod renderer;

pub use database::{
    DiagramEdge, DiagramNode, FlowDiagram, NodeConfig, APPROVAL_STYLE, COMMIT_LABEL,
    DEFAULT_TITLE, REJECT_LABEL,
};
pub use renderer::FlowRenderer;
