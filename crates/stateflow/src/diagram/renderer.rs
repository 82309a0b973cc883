//! Flow diagram ASCII renderer
//!
//! Walks the graph from its root and lays each subtree out as a block of
//! text rows with one anchor row, the row a parent's arrow attaches to.
//!
//! ```text
//!      +--> B
//!      |
//! A -->+--> C --> E
//!      |
//!      +--> D
//! ```

use std::collections::HashSet;

use tracing::{debug, info_span, trace};

use super::database::{DiagramEdge, FlowDiagram, NodeConfig, APPROVAL_STYLE};
use crate::core::{
    blank_like, display_width, join_trimmed, CharacterSet, Database, Renderer, Result, Symbols,
};

/// Rendered subtree
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    lines: Vec<String>,
    anchor: usize,
}

impl Block {
    fn single(line: String) -> Self {
        Self {
            lines: vec![line],
            anchor: 0,
        }
    }

    /// Rows before the anchor
    fn above(&self) -> usize {
        self.anchor
    }

    /// Rows after the anchor
    fn below(&self) -> usize {
        self.lines.len() - self.anchor - 1
    }
}

/// One row of an assembled branch fan-out
#[derive(Debug)]
struct BranchRow {
    content: String,
    /// Owning branch; `None` for separators
    branch: Option<usize>,
    is_anchor: bool,
}

impl BranchRow {
    fn separator() -> Self {
        Self {
            content: String::new(),
            branch: None,
            is_anchor: false,
        }
    }

    fn padding(branch: usize) -> Self {
        Self {
            content: String::new(),
            branch: Some(branch),
            is_anchor: false,
        }
    }
}

/// Glyphs for one parent node: its overrides merged over the symbol table
struct Glyphs {
    junction: char,
    corner_top: char,
    corner_bottom: char,
    intersection: char,
}

impl Glyphs {
    fn resolve(symbols: &Symbols, config: Option<&NodeConfig>) -> Self {
        let config = config.cloned().unwrap_or_default();
        Self {
            junction: config.junction.unwrap_or(symbols.junction),
            corner_top: config.corner_top.unwrap_or(symbols.corner_top),
            corner_bottom: config.corner_bottom.unwrap_or(symbols.corner_bottom),
            intersection: config.intersection.unwrap_or(symbols.intersection),
        }
    }
}

/// ASCII renderer for [`FlowDiagram`]
pub struct FlowRenderer {
    style: CharacterSet,
    symbols: Symbols,
}

impl FlowRenderer {
    pub fn new() -> Self {
        Self::with_style(CharacterSet::default())
    }

    pub fn with_style(style: CharacterSet) -> Self {
        Self {
            style,
            symbols: Symbols::new(style),
        }
    }

    pub fn style(&self) -> CharacterSet {
        self.style
    }

    /// Render the diagram; an empty diagram renders as an empty string
    pub fn render_diagram(&self, diagram: &FlowDiagram) -> String {
        let span = info_span!("render_diagram", style = %self.style);
        let _enter = span.enter();

        let Some(root) = diagram.entry() else {
            debug!("Empty diagram");
            return String::new();
        };

        let block = self.render_flow(diagram, root, HashSet::new());
        let output = join_trimmed(&block.lines);
        debug!(root, rows = block.lines.len(), output_len = output.len(), "Rendered flow diagram");
        output
    }

    /// Render wrapped in a titled, fenced line-comment block
    pub fn render_comment(&self, diagram: &FlowDiagram) -> String {
        let output = self.render_diagram(diagram);
        if output.is_empty() {
            return output;
        }

        let mut lines = vec![format!("// {}:", diagram.title()), "// ```".to_string()];
        lines.extend(output.lines().map(|line| format!("// {}", line)));
        lines.push("// ```".to_string());
        join_trimmed(&lines)
    }

    fn edge_label<'a>(&'a self, edge: &'a DiagramEdge) -> &'a str {
        edge.label.as_deref().unwrap_or(self.symbols.arrow)
    }

    /// Connector drawn after a corner glyph: the bare arrow, or
    /// `-- <label> -->` for a labelled edge
    fn branch_label(&self, edge: &DiagramEdge) -> String {
        match &edge.label {
            Some(label) => format!("-- <{}> {}", label, self.symbols.arrow),
            None => self.symbols.arrow.to_string(),
        }
    }

    /// Lay out the subtree under `id`
    ///
    /// `visited` holds the nodes on the current path. Each child receives
    /// its own copy, so sibling branches never see each other's nodes.
    fn render_flow(&self, diagram: &FlowDiagram, id: &str, mut visited: HashSet<String>) -> Block {
        let label = diagram.label(id);

        if visited.contains(id) {
            trace!(node = id, "Cycle closed");
            return Block::single(format!("{} {}", label, self.symbols.loop_marker));
        }

        let edges = diagram.edges_from(id);
        if edges.is_empty() {
            return Block::single(label.to_string());
        }

        visited.insert(id.to_string());

        if Self::is_approval(diagram, edges) {
            return self.render_approval(diagram, label, edges, &visited);
        }

        match edges {
            [edge] => self.render_single(diagram, label, edge, visited),
            _ => self.render_branches(diagram, id, label, edges, &visited),
        }
    }

    /// Commit, pending and Reject edges with the pending stage in the middle
    fn is_approval(diagram: &FlowDiagram, edges: &[DiagramEdge]) -> bool {
        edges.len() == 3
            && diagram
                .node(&edges[1].to)
                .is_some_and(|node| node.has_style(APPROVAL_STYLE))
    }

    fn render_single(
        &self,
        diagram: &FlowDiagram,
        label: &str,
        edge: &DiagramEdge,
        visited: HashSet<String>,
    ) -> Block {
        let child = self.render_flow(diagram, &edge.to, visited);
        let prefix = format!("{} {} ", label, self.edge_label(edge));
        let pad = blank_like(&prefix);

        let lines = child
            .lines
            .iter()
            .enumerate()
            .map(|(row, line)| {
                if row == child.anchor {
                    format!("{}{}", prefix, line)
                } else {
                    format!("{}{}", pad, line)
                }
            })
            .collect();

        Block {
            lines,
            anchor: child.anchor,
        }
    }

    fn render_branches(
        &self,
        diagram: &FlowDiagram,
        id: &str,
        label: &str,
        edges: &[DiagramEdge],
        visited: &HashSet<String>,
    ) -> Block {
        let branches: Vec<Block> = edges
            .iter()
            .map(|edge| self.render_flow(diagram, &edge.to, visited.clone()))
            .collect();

        let count = branches.len();
        let upper_half = count / 2;
        let even = count % 2 == 0;

        // The two innermost branches reach equally far toward the centre.
        // Even counts take no minimum of one row: two single-line branches
        // stay a three-row block with the junction row between them.
        let max_extend = branches[upper_half - 1]
            .below()
            .max(branches[upper_half].above());

        let mut rows: Vec<BranchRow> = Vec::new();
        let mut center = None;

        for (index, branch) in branches.iter().enumerate() {
            if index == upper_half {
                for _ in branch.above()..max_extend {
                    rows.push(BranchRow::padding(index));
                }
            }
            for (row, line) in branch.lines.iter().enumerate() {
                if !even && index == upper_half && row == branch.anchor {
                    center = Some(rows.len());
                }
                rows.push(BranchRow {
                    content: line.clone(),
                    branch: Some(index),
                    is_anchor: row == branch.anchor,
                });
            }
            if index + 1 == upper_half {
                for _ in branch.below()..max_extend {
                    rows.push(BranchRow::padding(index));
                }
            }
            if index + 1 < count {
                if even && index + 1 == upper_half {
                    center = Some(rows.len());
                }
                rows.push(BranchRow::separator());
            }
        }

        let anchors: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_anchor)
            .map(|(index, _)| index)
            .collect();
        let first_anchor = anchors.first().copied().unwrap_or_default();
        let last_anchor = anchors.last().copied().unwrap_or_default();
        let center = center.unwrap_or(first_anchor);

        let glyphs = Glyphs::resolve(&self.symbols, diagram.node(id).map(|n| &n.config));
        let prefix = format!("{} {}", label, self.symbols.arrow);
        let indent = blank_like(&prefix);

        let lines = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let edge_label = row
                    .branch
                    .map(|b| self.branch_label(&edges[b]))
                    .unwrap_or_default();

                let glyph = if row.is_anchor {
                    if index == first_anchor {
                        glyphs.corner_top
                    } else if index == last_anchor {
                        glyphs.corner_bottom
                    } else {
                        glyphs.intersection
                    }
                } else if index > first_anchor && index < last_anchor {
                    self.symbols.vertical
                } else {
                    ' '
                };

                if index == center {
                    if row.is_anchor {
                        format!("{}{}{} {}", prefix, glyph, edge_label, row.content)
                    } else {
                        format!("{}{}", prefix, glyphs.junction)
                    }
                } else if row.is_anchor {
                    format!("{}{}{} {}", indent, glyph, edge_label, row.content)
                } else if row.branch.is_some() {
                    let gap = " ".repeat(display_width(&edge_label) + 1);
                    format!("{}{}{}{}", indent, glyph, gap, row.content)
                } else {
                    format!("{}{}", indent, glyph)
                }
            })
            .collect();

        trace!(node = id, branches = count, center, "Laid out branches");
        Block {
            lines,
            anchor: center,
        }
    }

    /// Fixed three-part approval layout
    ///
    /// ```text
    ///           -- <Commit> --> Published
    ///           |
    /// Draft --> Reviewing (via)
    ///           |
    ///           -- <Reject> --> Draft 🔁
    /// ```
    ///
    /// Gap rows keep the pending row equidistant from both anchors.
    fn render_approval(
        &self,
        diagram: &FlowDiagram,
        label: &str,
        edges: &[DiagramEdge],
        visited: &HashSet<String>,
    ) -> Block {
        let (commit_edge, via_edge, reject_edge) = (&edges[0], &edges[1], &edges[2]);
        let commit = self.render_flow(diagram, &commit_edge.to, visited.clone());
        let reject = self.render_flow(diagram, &reject_edge.to, visited.clone());

        let head = format!("{} {} ", label, self.symbols.arrow);
        let indent = blank_like(&head);
        let bar = self.symbols.vertical;

        let commit_prefix = format!("{} ", self.branch_label(commit_edge));
        let reject_prefix = format!("{} ", self.branch_label(reject_edge));
        let connected = |prefix: &str| {
            format!("{}{}", bar, " ".repeat(display_width(prefix).saturating_sub(1)))
        };

        let gap_top = reject.above().saturating_sub(commit.below());
        let gap_bottom = commit.below().saturating_sub(reject.above());

        let mut lines = Vec::new();

        for (row, line) in commit.lines.iter().enumerate() {
            let lead = match row.cmp(&commit.anchor) {
                std::cmp::Ordering::Less => blank_like(&commit_prefix),
                std::cmp::Ordering::Equal => commit_prefix.clone(),
                std::cmp::Ordering::Greater => connected(&commit_prefix),
            };
            lines.push(format!("{}{}{}", indent, lead, line));
        }
        for _ in 0..gap_top {
            lines.push(format!("{}{}", indent, bar));
        }
        lines.push(format!("{}{}", indent, bar));

        let anchor = lines.len();
        lines.push(format!("{}{}", head, diagram.label(&via_edge.to)));

        lines.push(format!("{}{}", indent, bar));
        for _ in 0..gap_bottom {
            lines.push(format!("{}{}", indent, bar));
        }
        for (row, line) in reject.lines.iter().enumerate() {
            let lead = match row.cmp(&reject.anchor) {
                std::cmp::Ordering::Less => connected(&reject_prefix),
                std::cmp::Ordering::Equal => reject_prefix.clone(),
                std::cmp::Ordering::Greater => blank_like(&reject_prefix),
            };
            lines.push(format!("{}{}{}", indent, lead, line));
        }

        trace!(gap_top, gap_bottom, anchor, "Laid out approval");
        Block { lines, anchor }
    }
}

impl Default for FlowRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<FlowDiagram> for FlowRenderer {
    type Output = String;

    fn render(&self, database: &FlowDiagram) -> Result<Self::Output> {
        Ok(self.render_diagram(database))
    }

    fn name(&self) -> &'static str {
        "flow"
    }

    fn character_set(&self) -> CharacterSet {
        self.style
    }
}

impl FlowDiagram {
    /// Render with the default ASCII symbols
    pub fn render(&self) -> String {
        FlowRenderer::new().render_diagram(self)
    }

    /// Render wrapped in a `// <title>:` fenced comment block
    pub fn render_as_comment(&self) -> String {
        FlowRenderer::new().render_comment(self)
    }
}
