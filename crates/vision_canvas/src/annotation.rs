//! Annotation model.
//!
//! An [`Annotation`] is a plain value: a kind tag, a [`Shape`] stored in image
//! space, and a selection flag. Drawing and hit-testing project the shape into
//! canvas space through a [`CoordinateMapper`] at call time, so annotations stay
//! valid across resizes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::geometry::{CanvasPoint, CanvasRect, ImagePoint};
use crate::mapping::CoordinateMapper;
use crate::paint::Painter;
use crate::theme::{AnnotationTheme, HandleStyle};

/// Draggable control point identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Point,
    Start,
    End,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    /// String id used by hosts and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::Point => "point",
            Handle::Start => "start",
            Handle::End => "end",
            Handle::TopLeft => "topLeft",
            Handle::TopRight => "topRight",
            Handle::BottomLeft => "bottomLeft",
            Handle::BottomRight => "bottomRight",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "point" => Some(Handle::Point),
            "start" => Some(Handle::Start),
            "end" => Some(Handle::End),
            "topLeft" => Some(Handle::TopLeft),
            "topRight" => Some(Handle::TopRight),
            "bottomLeft" => Some(Handle::BottomLeft),
            "bottomRight" => Some(Handle::BottomRight),
            _ => None,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const POINT_HANDLES: &[Handle] = &[Handle::Point];
const LINE_HANDLES: &[Handle] = &[Handle::Start, Handle::End];
const RECT_HANDLES: &[Handle] = &[
    Handle::TopLeft,
    Handle::TopRight,
    Handle::BottomLeft,
    Handle::BottomRight,
];

/// The geometric family of a shape. Several kinds can share one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    Point,
    Line,
    Rectangle,
}

impl Geometry {
    pub fn name(&self) -> &'static str {
        match self {
            Geometry::Point => "point",
            Geometry::Line => "line",
            Geometry::Rectangle => "rectangle",
        }
    }

    /// Handle ids in hit-test order.
    pub fn handles(&self) -> &'static [Handle] {
        match self {
            Geometry::Point => POINT_HANDLES,
            Geometry::Line => LINE_HANDLES,
            Geometry::Rectangle => RECT_HANDLES,
        }
    }

    pub fn handle_style<'a>(&self, theme: &'a AnnotationTheme) -> &'a HandleStyle {
        match self {
            Geometry::Point => &theme.point.handle,
            Geometry::Line => &theme.line.handle,
            Geometry::Rectangle => &theme.rectangle.handle,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape data in image coordinates.
///
/// Rectangle corners are derived from `start` and `end`, which are not
/// required to be ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Point { coord: ImagePoint },
    Line { start: ImagePoint, end: ImagePoint },
    Rectangle { start: ImagePoint, end: ImagePoint },
}

impl Shape {
    /// A zero-extent shape anchored at `at`, used while a tool is capturing.
    pub fn degenerate(geometry: Geometry, at: ImagePoint) -> Self {
        match geometry {
            Geometry::Point => Shape::Point { coord: at },
            Geometry::Line => Shape::Line { start: at, end: at },
            Geometry::Rectangle => Shape::Rectangle { start: at, end: at },
        }
    }

    pub fn geometry(&self) -> Geometry {
        match self {
            Shape::Point { .. } => Geometry::Point,
            Shape::Line { .. } => Geometry::Line,
            Shape::Rectangle { .. } => Geometry::Rectangle,
        }
    }

    /// Move the free end. For a point this moves the point itself.
    pub fn set_end(&mut self, at: ImagePoint) {
        match self {
            Shape::Point { coord } => *coord = at,
            Shape::Line { end, .. } | Shape::Rectangle { end, .. } => *end = at,
        }
    }

    /// Image position of a handle, `None` if the shape has no such handle.
    ///
    /// Rectangle corners are named from the stored `start`/`end`, not from
    /// min/max-normalized corners, so a grabbed corner stays the same handle
    /// when a drag inverts the rectangle. Keep this in sync with
    /// [`Shape::move_handle`].
    pub fn handle_position(&self, handle: Handle) -> Option<ImagePoint> {
        match (self, handle) {
            (Shape::Point { coord }, Handle::Point) => Some(*coord),
            (Shape::Line { start, .. }, Handle::Start) => Some(*start),
            (Shape::Line { end, .. }, Handle::End) => Some(*end),
            (Shape::Rectangle { start, end }, corner) => match corner {
                Handle::TopLeft => Some(ImagePoint::new(start.img_x, start.img_y)),
                Handle::TopRight => Some(ImagePoint::new(end.img_x, start.img_y)),
                Handle::BottomLeft => Some(ImagePoint::new(start.img_x, end.img_y)),
                Handle::BottomRight => Some(ImagePoint::new(end.img_x, end.img_y)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Apply a handle drag. Each rectangle corner updates one coordinate of
    /// `start` and/or `end`:
    ///
    /// | handle | mutates |
    /// |---|---|
    /// | topLeft | start.x, start.y |
    /// | topRight | end.x, start.y |
    /// | bottomLeft | start.x, end.y |
    /// | bottomRight | end.x, end.y |
    ///
    /// Returns `false` if the handle does not belong to this shape.
    pub fn move_handle(&mut self, handle: Handle, to: ImagePoint) -> bool {
        match (self, handle) {
            (Shape::Point { coord }, Handle::Point) => *coord = to,
            (Shape::Line { start, .. }, Handle::Start) => *start = to,
            (Shape::Line { end, .. }, Handle::End) => *end = to,
            (Shape::Rectangle { start, end }, corner) => match corner {
                Handle::TopLeft => {
                    start.img_x = to.img_x;
                    start.img_y = to.img_y;
                }
                Handle::TopRight => {
                    end.img_x = to.img_x;
                    start.img_y = to.img_y;
                }
                Handle::BottomLeft => {
                    start.img_x = to.img_x;
                    end.img_y = to.img_y;
                }
                Handle::BottomRight => {
                    end.img_x = to.img_x;
                    end.img_y = to.img_y;
                }
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Rebuild a shape of `geometry` from persisted fields.
    pub fn from_record(geometry: Geometry, record: &RecordGeometry) -> Option<Self> {
        match (geometry, record) {
            (Geometry::Point, RecordGeometry::Point { coord }) => Some(Shape::Point { coord: *coord }),
            (Geometry::Line, RecordGeometry::TwoPoint { start, end }) => Some(Shape::Line {
                start: *start,
                end: *end,
            }),
            (Geometry::Rectangle, RecordGeometry::TwoPoint { start, end }) => Some(Shape::Rectangle {
                start: *start,
                end: *end,
            }),
            _ => None,
        }
    }

    fn to_record(self) -> RecordGeometry {
        match self {
            Shape::Point { coord } => RecordGeometry::Point { coord },
            Shape::Line { start, end } | Shape::Rectangle { start, end } => RecordGeometry::TwoPoint { start, end },
        }
    }
}

/// A shape on the image, tagged with the kind that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    kind: String,
    shape: Shape,
    /// At most one annotation in a list is selected; the interaction
    /// manager enforces this.
    pub selected: bool,
}

impl Annotation {
    pub fn new(kind: impl Into<String>, shape: Shape) -> Self {
        Self {
            kind: kind.into(),
            shape,
            selected: false,
        }
    }

    pub fn point(kind: impl Into<String>, coord: ImagePoint) -> Self {
        Self::new(kind, Shape::Point { coord })
    }

    pub fn line(kind: impl Into<String>, start: ImagePoint, end: ImagePoint) -> Self {
        Self::new(kind, Shape::Line { start, end })
    }

    pub fn rectangle(kind: impl Into<String>, start: ImagePoint, end: ImagePoint) -> Self {
        Self::new(kind, Shape::Rectangle { start, end })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn geometry(&self) -> Geometry {
        self.shape.geometry()
    }

    pub fn set_end(&mut self, at: ImagePoint) {
        self.shape.set_end(at);
    }

    pub fn move_handle(&mut self, handle: Handle, to: ImagePoint) -> bool {
        self.shape.move_handle(handle, to)
    }

    fn threshold(&self, theme: &AnnotationTheme) -> f32 {
        theme.hit_threshold(self.geometry().handle_style(theme))
    }

    /// Whether `pos` touches the annotation body or one of its anchors.
    pub fn hit_test(&self, pos: CanvasPoint, mapper: &CoordinateMapper, theme: &AnnotationTheme) -> bool {
        let threshold = self.threshold(theme);
        match self.shape {
            Shape::Point { coord } => mapper
                .image_to_canvas(coord)
                .is_some_and(|c| pos.distance_to(&c) <= threshold),
            Shape::Line { start, end } => {
                let (Some(a), Some(b)) = (mapper.image_to_canvas(start), mapper.image_to_canvas(end)) else {
                    return false;
                };
                if pos.distance_to(&a) <= threshold || pos.distance_to(&b) <= threshold {
                    return true;
                }
                pos.distance_to_segment(&a, &b).is_some_and(|d| d < threshold)
            }
            Shape::Rectangle { .. } => {
                let corners = self.canvas_handles(mapper);
                if corners.len() != RECT_HANDLES.len() {
                    return false;
                }
                if corners.iter().any(|(_, c)| pos.distance_to(c) <= threshold) {
                    return true;
                }
                CanvasRect::from_corners(corners[0].1, corners[3].1).contains(&pos)
            }
        }
    }

    /// The first handle under `pos`, in [`Geometry::handles`] order.
    pub fn hit_test_handle(
        &self,
        pos: CanvasPoint,
        mapper: &CoordinateMapper,
        theme: &AnnotationTheme,
    ) -> Option<Handle> {
        let threshold = self.threshold(theme);
        self.canvas_handles(mapper)
            .into_iter()
            .find(|(_, c)| match self.geometry() {
                Geometry::Point => pos.distance_to(c) <= threshold,
                Geometry::Line | Geometry::Rectangle => c.within_box(&pos, threshold),
            })
            .map(|(handle, _)| handle)
    }

    /// Handles projected to canvas space. Empty when the mapper is unavailable.
    fn canvas_handles(&self, mapper: &CoordinateMapper) -> Vec<(Handle, CanvasPoint)> {
        self.geometry()
            .handles()
            .iter()
            .filter_map(|&h| {
                let at = self.shape.handle_position(h)?;
                Some((h, mapper.image_to_canvas(at)?))
            })
            .collect()
    }

    /// Draw the annotation. Handles of lines and rectangles are shown when
    /// selected or when `show_handles` is set (live previews).
    pub fn draw(
        &self,
        painter: &mut dyn Painter,
        mapper: &CoordinateMapper,
        theme: &AnnotationTheme,
        show_handles: bool,
    ) {
        let handles = self.canvas_handles(mapper);
        if handles.is_empty() {
            return;
        }

        match self.shape {
            Shape::Point { .. } => {
                let c = handles[0].1;
                let style = &theme.point;
                let half = style.cross_length / 2.0;
                painter.line(
                    CanvasPoint::new(c.x - half, c.y),
                    CanvasPoint::new(c.x + half, c.y),
                    style.cross_color,
                    style.cross_width,
                );
                painter.line(
                    CanvasPoint::new(c.x, c.y - half),
                    CanvasPoint::new(c.x, c.y + half),
                    style.cross_color,
                    style.cross_width,
                );
                painter.handle(c, &style.handle, self.selected);
                return;
            }
            Shape::Line { .. } => {
                painter.dashed_line(handles[0].1, handles[1].1, &theme.line.stroke, self.selected);
            }
            Shape::Rectangle { .. } => {
                let rect = CanvasRect::from_corners(handles[0].1, handles[3].1);
                painter.dashed_rect(rect, &theme.rectangle.stroke, self.selected);
            }
        }

        if self.selected || show_handles {
            let style = self.geometry().handle_style(theme);
            for (_, c) in handles {
                painter.handle(c, style, self.selected);
            }
        }
    }

    pub fn to_record(&self) -> AnnotationRecord {
        AnnotationRecord {
            kind: self.kind.clone(),
            geometry: self.shape.to_record(),
        }
    }

    pub fn to_json(&self) -> Result<String, AnnotationError> {
        Ok(serde_json::to_string(&self.to_record())?)
    }
}

/// Serialize a list of annotations as a JSON array of records.
pub fn list_to_json(annotations: &[Annotation]) -> Result<String, AnnotationError> {
    let records: Vec<AnnotationRecord> = annotations.iter().map(Annotation::to_record).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Persisted annotation: `{kind, coord}` or `{kind, start, end}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub geometry: RecordGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordGeometry {
    TwoPoint { start: ImagePoint, end: ImagePoint },
    Point { coord: ImagePoint },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DrawArea;
    use crate::paint::recording::{Op, RecordingPainter};

    fn p(x: f32, y: f32) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    /// 100x100 canvas area showing a 20x20 image (scale 5).
    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(Some(DrawArea::new(0.0, 0.0, 100.0, 100.0)), 20, 20)
    }

    #[test]
    fn test_rectangle_top_right_is_asymmetric() {
        let mut rect = Annotation::rectangle("rectangle", p(0.0, 0.0), p(10.0, 10.0));
        assert!(rect.move_handle(Handle::TopRight, p(20.0, 5.0)));
        assert_eq!(
            *rect.shape(),
            Shape::Rectangle {
                start: p(0.0, 5.0),
                end: p(20.0, 10.0)
            }
        );
    }

    #[test]
    fn test_rectangle_corner_table() {
        let base = Shape::Rectangle {
            start: p(0.0, 0.0),
            end: p(10.0, 10.0),
        };

        let mut s = base;
        s.move_handle(Handle::TopLeft, p(1.0, 2.0));
        assert_eq!(s, Shape::Rectangle { start: p(1.0, 2.0), end: p(10.0, 10.0) });

        let mut s = base;
        s.move_handle(Handle::BottomLeft, p(1.0, 2.0));
        assert_eq!(s, Shape::Rectangle { start: p(1.0, 0.0), end: p(10.0, 2.0) });

        let mut s = base;
        s.move_handle(Handle::BottomRight, p(1.0, 2.0));
        assert_eq!(s, Shape::Rectangle { start: p(0.0, 0.0), end: p(1.0, 2.0) });
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let mut line = Annotation::line("line", p(0.0, 0.0), p(1.0, 1.0));
        assert!(!line.move_handle(Handle::TopLeft, p(5.0, 5.0)));
        assert_eq!(*line.shape(), Shape::Line { start: p(0.0, 0.0), end: p(1.0, 1.0) });
    }

    #[test]
    fn test_degenerate_line_hit_test() {
        let theme = AnnotationTheme::default();
        let line = Annotation::line("line", p(5.0, 5.0), p(5.0, 5.0));
        assert!(line.hit_test(CanvasPoint::new(25.0, 25.0), &mapper(), &theme));
        assert!(!line.hit_test(CanvasPoint::new(75.0, 25.0), &mapper(), &theme));
    }

    #[test]
    fn test_line_segment_hit_test() {
        let theme = AnnotationTheme::default();
        let line = Annotation::line("line", p(0.0, 0.0), p(20.0, 0.0));
        assert!(line.hit_test(CanvasPoint::new(50.0, 5.0), &mapper(), &theme));
        assert!(!line.hit_test(CanvasPoint::new(50.0, 7.0), &mapper(), &theme));
    }

    #[test]
    fn test_point_hit_test_threshold() {
        let theme = AnnotationTheme::default();
        let point = Annotation::point("point", p(10.0, 10.0));
        assert!(point.hit_test(CanvasPoint::new(56.5, 50.0), &mapper(), &theme));
        assert!(!point.hit_test(CanvasPoint::new(57.0, 50.0), &mapper(), &theme));
        assert_eq!(
            point.hit_test_handle(CanvasPoint::new(53.0, 53.0), &mapper(), &theme),
            Some(Handle::Point)
        );
    }

    #[test]
    fn test_rectangle_hit_test_inside_and_corners() {
        let theme = AnnotationTheme::default();
        let rect = Annotation::rectangle("rectangle", p(10.0, 10.0), p(2.0, 2.0));
        assert!(rect.hit_test(CanvasPoint::new(30.0, 30.0), &mapper(), &theme));
        assert!(rect.hit_test(CanvasPoint::new(54.0, 54.0), &mapper(), &theme));
        assert!(!rect.hit_test(CanvasPoint::new(80.0, 30.0), &mapper(), &theme));
    }

    #[test]
    fn test_rectangle_handles_follow_stored_corners() {
        let theme = AnnotationTheme::default();
        let rect = Annotation::rectangle("rectangle", p(0.0, 0.0), p(10.0, 10.0));
        let m = mapper();
        assert_eq!(rect.hit_test_handle(CanvasPoint::new(50.0, 1.0), &m, &theme), Some(Handle::TopRight));
        assert_eq!(rect.hit_test_handle(CanvasPoint::new(2.0, 48.0), &m, &theme), Some(Handle::BottomLeft));
        assert_eq!(rect.hit_test_handle(CanvasPoint::new(25.0, 25.0), &m, &theme), None);
    }

    #[test]
    fn test_line_handle_order() {
        let theme = AnnotationTheme::default();
        let line = Annotation::line("line", p(0.0, 0.0), p(0.0, 0.0));
        assert_eq!(
            line.hit_test_handle(CanvasPoint::new(0.0, 0.0), &mapper(), &theme),
            Some(Handle::Start)
        );
    }

    #[test]
    fn test_unavailable_mapper_never_hits() {
        let theme = AnnotationTheme::default();
        let point = Annotation::point("point", p(0.0, 0.0));
        let m = CoordinateMapper::unavailable();
        assert!(!point.hit_test(CanvasPoint::new(0.0, 0.0), &m, &theme));
        assert_eq!(point.hit_test_handle(CanvasPoint::new(0.0, 0.0), &m, &theme), None);
    }

    #[test]
    fn test_draw_selected_rectangle_shows_handles() {
        let theme = AnnotationTheme::default();
        let mut rect = Annotation::rectangle("rectangle", p(0.0, 0.0), p(10.0, 10.0));

        let mut painter = RecordingPainter::default();
        rect.draw(&mut painter, &mapper(), &theme, false);
        assert_eq!(painter.ops.len(), 1);

        rect.selected = true;
        let mut painter = RecordingPainter::default();
        rect.draw(&mut painter, &mapper(), &theme, false);
        assert!(matches!(painter.ops[0], Op::DashedRect(_, true)));
        assert_eq!(painter.handles().len(), 4);
    }

    #[test]
    fn test_draw_point_crosshair() {
        let theme = AnnotationTheme::default();
        let point = Annotation::point("point", p(10.0, 10.0));
        let mut painter = RecordingPainter::default();
        point.draw(&mut painter, &mapper(), &theme, false);
        assert_eq!(
            painter.ops[0],
            Op::Line(CanvasPoint::new(46.5, 50.0), CanvasPoint::new(53.5, 50.0))
        );
        assert_eq!(painter.handles(), vec![CanvasPoint::new(50.0, 50.0)]);
    }

    #[test]
    fn test_record_json_shapes() {
        let point = Annotation::point("point", p(1.0, 2.0));
        assert_eq!(
            point.to_json().unwrap(),
            r#"{"kind":"point","coord":{"imgX":1.0,"imgY":2.0}}"#
        );

        let line = Annotation::line("line", p(1.0, 2.0), p(3.0, 4.0));
        assert_eq!(
            line.to_json().unwrap(),
            r#"{"kind":"line","start":{"imgX":1.0,"imgY":2.0},"end":{"imgX":3.0,"imgY":4.0}}"#
        );
    }

    #[test]
    fn test_record_accepts_legacy_type_field() {
        let record: AnnotationRecord =
            serde_json::from_str(r#"{"type":"point","coord":{"imgX":4,"imgY":5}}"#).unwrap();
        assert_eq!(record.kind, "point");
        assert_eq!(record.geometry, RecordGeometry::Point { coord: p(4.0, 5.0) });
    }

    #[test]
    fn test_handle_ids_round_trip() {
        for geometry in [Geometry::Point, Geometry::Line, Geometry::Rectangle] {
            for handle in geometry.handles() {
                assert_eq!(Handle::from_id(handle.as_str()), Some(*handle));
            }
        }
        assert_eq!(Handle::from_id("middle"), None);
    }
}
