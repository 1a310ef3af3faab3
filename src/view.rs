//! The host-facing view
//!
//! `JsonView` owns the current document and its layout, the way a widget
//! would. A document is replaced wholesale on every `set_json`; measuring
//! is cached until the document or the configuration changes, and drawing
//! can be repeated against the cached layout.

use crate::error::Result;
use crate::layout::{Layout, LayoutEngine, Position};
use crate::metrics::TextMetrics;
use crate::renderer::{Canvas, Renderer};
use crate::style::StyleConfig;
use crate::tree::{quote_if, LayoutNode, LayoutTree, NodeKind};
use serde::Serialize;
use std::fmt::Write;

/// The root is measured from line 1 so the first baseline sits one line
/// height below the top edge.
pub const FIRST_LINE: usize = 1;

/// Size the host should give the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Outcome of a successful `set_json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Loaded,
    /// A bare scalar at top level; the previous document is kept
    UnsupportedTopLevel,
}

#[derive(Default)]
pub struct JsonView {
    config: StyleConfig,
    tree: Option<LayoutTree>,
    layout: Option<Layout>,
    size: SurfaceSize,
}

impl JsonView {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config,
            tree: None,
            layout: None,
            size: SurfaceSize::default(),
        }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StyleConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Drop the cached layout; the next `measure` lays out from scratch.
    pub fn invalidate(&mut self) {
        self.layout = None;
    }

    /// Replace the document. A parse error or a top-level scalar leaves the
    /// current document, layout and size untouched.
    pub fn set_json(&mut self, text: &str) -> Result<DocumentStatus> {
        match LayoutTree::parse(text)? {
            Some(tree) => {
                log::debug!("document loaded: {} nodes", tree.node_count());
                self.tree = Some(tree);
                self.invalidate();
                Ok(DocumentStatus::Loaded)
            }
            None => {
                log::warn!("top-level JSON value is not an object or array; ignoring document");
                Ok(DocumentStatus::UnsupportedTopLevel)
            }
        }
    }

    pub fn tree(&self) -> Option<&LayoutTree> {
        self.tree.as_ref()
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Lay out the document if needed and report the surface size. With no
    /// document the previous size is returned unchanged.
    ///
    /// `metrics` must stay the same between calls unless the view is
    /// invalidated.
    pub fn measure<M: TextMetrics + ?Sized>(&mut self, desired_width: u32, metrics: &M) -> SurfaceSize {
        let Some(tree) = &self.tree else {
            return self.size;
        };
        let layout = self
            .layout
            .get_or_insert_with(|| LayoutEngine::new(&self.config, metrics).measure(tree, Position::new(0.0, FIRST_LINE)));

        let extent = layout.extent();
        self.size = SurfaceSize {
            width: desired_width.max(extent.max_x.round() as u32),
            height: (extent.line_count as f32 * self.config.line_height_px()).round() as u32,
        };
        self.size
    }

    /// Paint the measured document. Returns `false` when there is nothing
    /// measured to paint.
    pub fn draw<M, C>(&self, metrics: &M, canvas: &mut C) -> bool
    where
        M: TextMetrics + ?Sized,
        C: Canvas + ?Sized,
    {
        match (&self.tree, &self.layout) {
            (Some(tree), Some(layout)) => {
                Renderer::new(&self.config, metrics).draw(tree, layout, canvas);
                true
            }
            _ => false,
        }
    }

    /// Indented dump of every node's span, for debugging layouts
    pub fn layout_report(&self) -> Option<String> {
        let (tree, layout) = (self.tree.as_ref()?, self.layout.as_ref()?);
        let mut out = String::new();
        let extent = layout.extent();
        let _ = writeln!(out, "lines={} max_x={:.1}", extent.line_count, extent.max_x);
        self.report_node(tree.root(), layout, None, 0, &mut out);
        Some(out)
    }

    fn report_node(&self, node: &LayoutNode, layout: &Layout, label: Option<&str>, indent: usize, out: &mut String) {
        let span = layout.span(node.id);
        let prefix = " ".repeat(indent);
        let label = label.map(|l| format!("{}: ", l)).unwrap_or_default();
        let what = match &node.kind {
            NodeKind::Object(props) => format!("Object({})", props.len()),
            NodeKind::Array(items) => format!("Array({})", items.len()),
            NodeKind::Scalar(scalar) => format!("Scalar {}", scalar.display_text(self.config.enquote_strings())),
        };
        let _ = writeln!(
            out,
            "{}{}{} start=({:.1}, {}) end=({:.1}, {})",
            prefix, label, what, span.start.x, span.start.line, span.end.x, span.end.line
        );

        match &node.kind {
            NodeKind::Object(props) => {
                for prop in props {
                    let name = quote_if(&prop.name, self.config.enquote_property_names());
                    self.report_node(&prop.value, layout, Some(name.as_ref()), indent + 2, out);
                }
            }
            NodeKind::Array(items) => {
                for item in items {
                    self.report_node(item, layout, None, indent + 2, out);
                }
            }
            NodeKind::Scalar(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::metrics::EstimatedMetrics;
    use crate::renderer::PaintList;

    fn metrics() -> EstimatedMetrics {
        EstimatedMetrics::with_advance_ratio(0.5)
    }

    #[test]
    fn measure_sizes_the_surface() {
        let mut view = JsonView::default();
        assert_eq!(view.set_json(r#"{"a":1,"b":"x"}"#).unwrap(), DocumentStatus::Loaded);
        let size = view.measure(10, &metrics());
        assert_eq!(size, SurfaceSize { width: 80, height: 96 });
        // desired width wins when it is wider
        assert_eq!(view.measure(500, &metrics()).width, 500);
    }

    #[test]
    fn bare_scalar_draws_nothing() {
        let mut view = JsonView::default();
        assert_eq!(view.set_json("42").unwrap(), DocumentStatus::UnsupportedTopLevel);
        assert_eq!(view.measure(0, &metrics()), SurfaceSize::default());
        let mut list = PaintList::new();
        assert!(!view.draw(&metrics(), &mut list));
        assert!(list.is_empty());
    }

    #[test]
    fn rejected_documents_keep_previous_state() {
        let mut view = JsonView::default();
        view.set_json("[1,2]").unwrap();
        let before = view.measure(0, &metrics());

        assert_eq!(view.set_json("true").unwrap(), DocumentStatus::UnsupportedTopLevel);
        assert_eq!(view.measure(0, &metrics()), before);

        assert!(matches!(view.set_json("[1,"), Err(ViewError::Parse(_))));
        assert_eq!(view.measure(0, &metrics()), before);
        assert!(view.layout().is_some());
    }

    #[test]
    fn new_document_is_relaid_out() {
        let mut view = JsonView::default();
        view.set_json("[1]").unwrap();
        let small = view.measure(0, &metrics());
        view.set_json(r#"{"a":[1,2,3]}"#).unwrap();
        assert!(view.layout().is_none());
        let large = view.measure(0, &metrics());
        assert!(large.height > small.height);
    }

    #[test]
    fn draw_needs_a_measure_first() {
        let mut view = JsonView::default();
        view.set_json("[]").unwrap();
        let mut list = PaintList::new();
        assert!(!view.draw(&metrics(), &mut list));
        view.measure(0, &metrics());
        assert!(view.draw(&metrics(), &mut list));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn config_change_invalidates_layout() {
        let mut view = JsonView::default();
        view.set_json(r#"{"a":"b"}"#).unwrap();
        view.measure(0, &metrics());
        let options = crate::style::StyleOptions {
            text_size: Some(10.0),
            ..Default::default()
        };
        view.set_config(options.resolve().unwrap());
        assert!(view.layout().is_none());
        assert_eq!(view.measure(0, &metrics()).height, 36);
    }

    #[test]
    fn layout_report_lists_every_node() {
        let mut view = JsonView::default();
        view.set_json(r#"{"a":[true]}"#).unwrap();
        assert!(view.layout_report().is_none());
        view.measure(0, &metrics());
        let report = view.layout_report().unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "lines=4 max_x=90.0");
        assert_eq!(lines[1], "Object(1) start=(0.0, 1) end=(10.0, 4)");
        assert_eq!(lines[2], "  a: Array(1) start=(50.0, 2) end=(90.0, 3)");
        assert_eq!(lines[3], "    Scalar true start=(40.0, 3) end=(80.0, 3)");
    }
}
