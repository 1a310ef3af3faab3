//! Draw pass
//!
//! Re-walks a measured tree in the same pre-order as the measure pass and
//! paints every token at the coordinates the [`Layout`] recorded. Painting
//! goes through a [`Canvas`], so the same pass can rasterize into a
//! framebuffer or record a replayable [`PaintList`].

use crate::layout::Layout;
use crate::metrics::TextMetrics;
use crate::style::{Role, Style, StyleConfig};
use crate::tree::{quote_if, LayoutNode, LayoutTree, NodeKind};
use serde::Serialize;

/// Something text runs can be painted onto. `y` is the text baseline.
pub trait Canvas {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, role: Role, style: &Style);
}

/// One recorded text paint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintCommand {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub role: Role,
    pub style: Style,
}

/// A canvas that only records what was painted, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaintList {
    commands: Vec<PaintCommand>,
}

impl PaintList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Paint every recorded command onto another canvas
    pub fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for cmd in &self.commands {
            canvas.draw_text(&cmd.text, cmd.x, cmd.y, cmd.role, &cmd.style);
        }
    }
}

impl Canvas for PaintList {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, role: Role, style: &Style) {
        self.commands.push(PaintCommand {
            text: text.to_string(),
            x,
            y,
            role,
            style: *style,
        });
    }
}

pub struct Renderer<'a, M: TextMetrics + ?Sized> {
    config: &'a StyleConfig,
    metrics: &'a M,
}

impl<'a, M: TextMetrics + ?Sized> Renderer<'a, M> {
    /// `config` and `metrics` must be the ones the layout was measured with.
    pub fn new(config: &'a StyleConfig, metrics: &'a M) -> Self {
        Self { config, metrics }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, tree: &LayoutTree, layout: &Layout, canvas: &mut C) {
        self.draw_node(tree.root(), layout, canvas);
    }

    fn width(&self, text: &str, role: Role) -> f32 {
        self.metrics.text_width(text, self.config.style(role))
    }

    fn paint<C: Canvas + ?Sized>(&self, canvas: &mut C, text: &str, x: f32, line: usize, role: Role) {
        let y = line as f32 * self.config.line_height_px();
        canvas.draw_text(text, x, y, role, self.config.style(role));
    }

    fn draw_node<C: Canvas + ?Sized>(&self, node: &LayoutNode, layout: &Layout, canvas: &mut C) {
        let span = layout.span(node.id);
        match &node.kind {
            NodeKind::Scalar(scalar) => {
                let text = scalar.display_text(self.config.enquote_strings());
                self.paint(canvas, &text, span.start.x, span.start.line, Role::PropertyValue);
            }
            NodeKind::Object(props) => {
                self.paint(canvas, "{", span.start.x, span.start.line, Role::Skeleton);
                let colon = self.width(": ", Role::Skeleton);
                for prop in props {
                    let child = layout.span(prop.value.id);
                    let name = quote_if(&prop.name, self.config.enquote_property_names());
                    let name_x = child.start.x - colon - self.width(&name, Role::PropertyName);
                    self.paint(canvas, &name, name_x, child.start.line, Role::PropertyName);
                    self.paint(canvas, ": ", child.start.x - colon, child.start.line, Role::Skeleton);
                    self.draw_node(&prop.value, layout, canvas);
                }
                let close_x = span.end.x - self.width("}", Role::Skeleton);
                self.paint(canvas, "}", close_x, span.end.line, Role::Skeleton);
            }
            NodeKind::Array(items) => {
                self.paint(canvas, "[", span.start.x, span.start.line, Role::Skeleton);
                for (i, item) in items.iter().enumerate() {
                    self.draw_node(item, layout, canvas);
                    if i + 1 < items.len() {
                        let end = layout.span(item.id).end;
                        self.paint(canvas, ",", end.x, end.line, Role::Skeleton);
                    }
                }
                let close_x = span.end.x - self.width("]", Role::Skeleton);
                self.paint(canvas, "]", close_x, span.end.line, Role::Skeleton);
            }
        }
    }
}
