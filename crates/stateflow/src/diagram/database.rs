//! Flow diagram database
//!
//! Nodes and edges live in order-preserving maps so rendering follows
//! insertion order. Each node carries its own glyph overrides.

use indexmap::IndexMap;
use tracing::trace;

use crate::core::{Database, Result};

/// Style tag that marks the pending stage of an approval transition
pub const APPROVAL_STYLE: &str = "approval";

/// Edge label of the committed branch of an approval transition
pub const COMMIT_LABEL: &str = "Commit";

/// Edge label of the rejected branch of an approval transition
pub const REJECT_LABEL: &str = "Reject";

/// Title used when a diagram has none
pub const DEFAULT_TITLE: &str = "State Flow";

/// Per-node rendering overrides
///
/// Unset glyphs fall back to the renderer's [`Symbols`](crate::core::Symbols).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    pub junction: Option<char>,
    pub corner_top: Option<char>,
    pub corner_bottom: Option<char>,
    pub intersection: Option<char>,
    /// Free-form tag; [`APPROVAL_STYLE`] switches on the approval layout
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    pub config: NodeConfig,
}

impl DiagramNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            config: NodeConfig::default(),
        }
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.config.style.as_deref() == Some(style)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
    /// `None` draws the renderer's arrow
    pub label: Option<String>,
}

impl DiagramEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn with_label(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            from: from.into(),
            to: to.into(),
            label: (!label.is_empty()).then_some(label),
        }
    }
}

/// Directed graph rendered as an ASCII flow diagram
#[derive(Debug, Clone, Default)]
pub struct FlowDiagram {
    nodes: IndexMap<String, DiagramNode>,
    edges: IndexMap<String, Vec<DiagramEdge>>,
    title: Option<String>,
}

impl FlowDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title shown by [`render_as_comment`](Self::render_as_comment)
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Add a node, or relabel it if it already exists
    pub fn add_node(&mut self, id: &str, label: &str) {
        match self.nodes.get_mut(id) {
            Some(node) => node.label = label.to_string(),
            None => {
                self.nodes.insert(id.to_string(), DiagramNode::new(id, label));
            }
        }
    }

    /// Add a node labelled by its id unless it already exists
    fn ensure_node(&mut self, id: &str) -> &mut DiagramNode {
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| DiagramNode::new(id, id))
    }

    /// Add an edge; an empty label draws the default arrow
    ///
    /// Unknown endpoints are added as nodes labelled by their id.
    pub fn add_edge(&mut self, from: &str, to: &str, label: &str) {
        self.insert_edge(DiagramEdge::with_label(from, to, label));
    }

    fn insert_edge(&mut self, edge: DiagramEdge) {
        self.ensure_node(&edge.from);
        self.ensure_node(&edge.to);
        trace!(from = %edge.from, to = %edge.to, label = ?edge.label, "Adding diagram edge");
        self.edges.entry(edge.from.clone()).or_default().push(edge);
    }

    pub fn set_junction(&mut self, id: &str, glyph: char) {
        self.ensure_node(id).config.junction = Some(glyph);
    }

    pub fn set_corner_top(&mut self, id: &str, glyph: char) {
        self.ensure_node(id).config.corner_top = Some(glyph);
    }

    pub fn set_corner_bottom(&mut self, id: &str, glyph: char) {
        self.ensure_node(id).config.corner_bottom = Some(glyph);
    }

    /// Set both corners at once
    pub fn set_corner(&mut self, id: &str, top: char, bottom: char) {
        let config = &mut self.ensure_node(id).config;
        config.corner_top = Some(top);
        config.corner_bottom = Some(bottom);
    }

    pub fn set_intersection(&mut self, id: &str, glyph: char) {
        self.ensure_node(id).config.intersection = Some(glyph);
    }

    pub fn set_node_style(&mut self, id: &str, style: &str) {
        self.ensure_node(id).config.style = Some(style.to_string());
    }

    /// Add the three edges of an approval step out of `from`
    ///
    /// `via` gets the approval style and a `(via)` label suffix, which the
    /// renderer turns into the Commit / via / Reject composition.
    pub fn add_approval_transition(&mut self, from: &str, via: &str, committed: &str, rejected: &str) {
        self.add_edge(from, committed, COMMIT_LABEL);
        self.add_edge(from, via, "");
        self.add_edge(from, rejected, REJECT_LABEL);
        self.set_node_style(via, APPROVAL_STYLE);

        let node = self.ensure_node(via);
        let suffix = format!(" {}", crate::core::Symbols::default().via_suffix);
        if !node.label.ends_with(&suffix) {
            node.label.push_str(&suffix);
        }
    }

    /// Plain edge with the default arrow
    pub fn add_direct_transition(&mut self, from: &str, to: &str) {
        self.add_edge(from, to, "");
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.get(id)
    }

    /// Display label of `id`, or the id itself for unknown nodes
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.nodes.get(id).map(|n| n.label.as_str()).unwrap_or(id)
    }

    /// Outgoing edges of `id` in insertion order
    pub fn edges_from(&self, id: &str) -> &[DiagramEdge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of edges pointing at each node, in node order
    pub fn in_degrees(&self) -> IndexMap<&str, usize> {
        let mut degrees: IndexMap<&str, usize> =
            self.nodes.keys().map(|id| (id.as_str(), 0)).collect();
        for edge in self.edges.values().flatten() {
            *degrees.entry(edge.to.as_str()).or_default() += 1;
        }
        degrees
    }

    /// Entry node: the first with no inbound edges, else the first inserted
    pub fn root(&self) -> Option<&str> {
        let degrees = self.in_degrees();
        degrees
            .iter()
            .find(|(_, degree)| **degree == 0)
            .or_else(|| degrees.first())
            .map(|(id, _)| *id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Database for FlowDiagram {
    type Node = DiagramNode;
    type Edge = DiagramEdge;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        self.insert_edge(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.nodes.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.nodes.values()
    }

    fn outgoing(&self, id: &str) -> impl Iterator<Item = &Self::Edge> {
        self.edges_from(id).iter()
    }

    fn entry(&self) -> Option<&str> {
        self.root()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
