//! Vision Canvas - annotation interaction for image widgets.
//!
//! This crate holds everything that happens between a pointer event on the
//! host canvas and a mutated list of annotations:
//!
//! - [`CoordinateMapper`]: image pixels <-> canvas draw area
//! - [`Annotation`]: point, line and rectangle shapes with hit-testing and handles
//! - [`KindRegistry`]: open set of annotation kinds keyed by string tag
//! - [`ShapeTool`]: per-gesture input capture that produces one annotation
//! - [`InteractionManager`]: routes pointer events to the active tool or to selection/dragging
//!
//! Rendering goes through the [`Painter`] trait so the host decides how pixels
//! end up on screen.

pub mod annotation;
pub mod callback;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod mapping;
pub mod paint;
pub mod registry;
pub mod theme;
pub mod tool;

pub use annotation::{Annotation, AnnotationRecord, Geometry, Handle, RecordGeometry, Shape};
pub use callback::Callback;
pub use error::AnnotationError;
pub use event::{Key, PointerKind, PointerPosition};
pub use geometry::{CanvasPoint, CanvasRect, DrawArea, ImagePoint};
pub use interaction::{InteractionManager, Selection};
pub use mapping::CoordinateMapper;
pub use paint::Painter;
pub use registry::{AnnotationKind, BuiltinKind, KindRegistry};
pub use theme::{AnnotationTheme, Color, DashStyle, HandleStyle, PointStyle, ShapeStyle};
pub use tool::{ShapeTool, ToolOutcome, ToolState};
