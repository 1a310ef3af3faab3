//! Measure pass
//!
//! Walks a [`LayoutTree`] in pre-order and gives every node a start and an
//! end [`Position`]. Children are placed top-down from the parent's cursor
//! and indentation level; line counts and the widest right edge come back
//! bottom-up as an [`Extent`].
//!
//! Indentation is purely a function of depth: a node at level `L` places its
//! own skeleton at `L * indent` and its children at `(L + 1) * indent`.
//! Object values are anchored after their property-name prefix, so the name
//! starts exactly on the indent column.

use crate::metrics::TextMetrics;
use crate::style::{Role, StyleConfig};
use crate::tree::{quote_if, LayoutNode, LayoutTree, NodeId, NodeKind};
use serde::Serialize;

/// Horizontal pixel offset plus line index
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f32,
    pub line: usize,
}

impl Position {
    pub fn new(x: f32, line: usize) -> Self {
        Self { x, line }
    }

    /// Baseline of this position's line
    pub fn y(&self, line_height: f32) -> f32 {
        self.line as f32 * line_height
    }
}

/// Where a node's first token starts and where its last token ends
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Number of lines the node covers
    pub fn lines(&self) -> usize {
        self.end.line - self.start.line + 1
    }
}

/// Aggregate size of a subtree
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Extent {
    pub line_count: usize,
    /// Rightmost edge of any token painted by the subtree
    pub max_x: f32,
}

/// Result of one measure pass: a span per node plus the root's extent
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    spans: Vec<Span>,
    extent: Extent,
}

impl Layout {
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn line_count(&self) -> usize {
        self.extent.line_count
    }

    pub fn max_x(&self) -> f32 {
        self.extent.max_x
    }
}

pub struct LayoutEngine<'a, M: TextMetrics + ?Sized> {
    config: &'a StyleConfig,
    metrics: &'a M,
}

impl<'a, M: TextMetrics + ?Sized> LayoutEngine<'a, M> {
    pub fn new(config: &'a StyleConfig, metrics: &'a M) -> Self {
        Self { config, metrics }
    }

    /// Lay out the whole tree with its root at `origin`, level 0.
    pub fn measure(&self, tree: &LayoutTree, origin: Position) -> Layout {
        let mut spans = vec![Span::default(); tree.node_count()];
        let extent = self.measure_node(tree.root(), origin, 0, &mut spans);
        log::debug!(
            "measured {} nodes: {} lines, max x {:.1}",
            tree.node_count(),
            extent.line_count,
            extent.max_x
        );
        Layout { spans, extent }
    }

    fn width(&self, text: &str, role: Role) -> f32 {
        self.metrics.text_width(text, self.config.style(role))
    }

    fn indent(&self, level: usize) -> f32 {
        level as f32 * self.config.indent_width_px()
    }

    fn measure_node(&self, node: &LayoutNode, start: Position, level: usize, spans: &mut [Span]) -> Extent {
        let (end, extent) = match &node.kind {
            NodeKind::Scalar(scalar) => {
                let text = scalar.display_text(self.config.enquote_strings());
                let end = Position::new(start.x + self.width(&text, Role::PropertyValue), start.line);
                (end, Extent { line_count: 1, max_x: end.x })
            }
            NodeKind::Object(props) => {
                let colon = self.width(": ", Role::Skeleton);
                let column = self.indent(level + 1);
                let mut line = start.line + 1;
                let mut lines = 0;
                let mut max_x = start.x + self.width("{", Role::Skeleton);

                for prop in props {
                    let name = quote_if(&prop.name, self.config.enquote_property_names());
                    let child_x = column + self.width(&name, Role::PropertyName) + colon;
                    let child = self.measure_node(&prop.value, Position::new(child_x, line), level + 1, spans);
                    lines += child.line_count;
                    max_x = max_x.max(child.max_x);
                    line = spans[prop.value.id.index()].end.line + 1;
                }

                // closing brace always gets its own line, back on this level's column
                let end = Position::new(self.indent(level) + self.width("}", Role::Skeleton), line);
                (end, Extent { line_count: lines + 2, max_x: max_x.max(end.x) })
            }
            NodeKind::Array(items) if items.is_empty() => {
                let end = Position::new(start.x + self.width("[]", Role::Skeleton), start.line);
                (end, Extent { line_count: 1, max_x: end.x })
            }
            NodeKind::Array(items) => {
                let comma = self.width(",", Role::Skeleton);
                let column = self.indent(level + 1);
                let mut line = start.line + 1;
                let mut lines = 0;
                let mut max_x = start.x + self.width("[", Role::Skeleton);
                let mut last_end = start;

                for (i, item) in items.iter().enumerate() {
                    let child = self.measure_node(item, Position::new(column, line), level + 1, spans);
                    lines += child.line_count;
                    max_x = max_x.max(child.max_x);
                    last_end = spans[item.id.index()].end;
                    if i + 1 < items.len() {
                        max_x = max_x.max(last_end.x + comma);
                    }
                    line = last_end.line + 1;
                }

                // closing bracket trails the last item on its own final line
                let end = Position::new(last_end.x + self.width("]", Role::Skeleton), last_end.line);
                (end, Extent { line_count: lines + 1, max_x: max_x.max(end.x) })
            }
        };

        spans[node.id.index()] = Span { start, end };
        extent
    }
}
