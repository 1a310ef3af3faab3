//! jsonview - syntax-colored JSON laid out at exact pixel positions
//!
//! A document goes through two passes. [`layout::LayoutEngine`] walks the
//! tree once and assigns every node a start and end position plus the
//! aggregate line count and width; [`renderer::Renderer`] walks it again and
//! paints each token at those positions onto any [`renderer::Canvas`].
//! [`view::JsonView`] ties both passes to a single document the way a host
//! widget would.

pub mod document;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod raster;
pub mod renderer;
pub mod source;
pub mod style;
pub mod tree;
pub mod view;

pub use error::{Result, ViewError};
pub use layout::{Extent, Layout, LayoutEngine, Position, Span};
pub use metrics::{EstimatedMetrics, TextMetrics};
pub use raster::{FontCanvas, FontMetrics, FrameBuffer};
pub use renderer::{Canvas, PaintCommand, PaintList, Renderer};
pub use style::{Color, Role, Style, StyleConfig, StyleOptions};
pub use tree::{LayoutNode, LayoutTree, NodeId, NodeKind, Property, Scalar};
pub use view::{DocumentStatus, JsonView, SurfaceSize};
