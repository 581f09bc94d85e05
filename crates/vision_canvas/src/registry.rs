//! Registry of annotation kinds.
//!
//! Kinds are an open set keyed by string tag. A registry is an explicit value
//! owned by whoever loads and creates annotations; there is no global table.

use std::collections::HashMap;
use std::fmt;

use crate::annotation::{Annotation, AnnotationRecord, Geometry, Shape};
use crate::callback::Callback;
use crate::error::AnnotationError;
use crate::tool::ShapeTool;

pub const POINT: &str = "point";
pub const LINE: &str = "line";
pub const RECTANGLE: &str = "rectangle";
pub const POINT2_REAL: &str = "TcVnPoint2_REAL";
pub const POINT2_LREAL: &str = "TcVnPoint2_LREAL";
pub const VECTOR4_DINT: &str = "TcVnVector4_DINT";
pub const RECTANGLE_DINT: &str = "(rectangle)TcVnRectangle_DINT";

/// Trait implemented by every annotation kind.
pub trait AnnotationKind: Send + Sync {
    /// Tag stored in the `kind` field of persisted records.
    fn tag(&self) -> &str;

    /// Human readable name for menus.
    fn display_name(&self) -> &str;

    fn geometry(&self) -> Geometry;

    /// Rebuild the shape of a persisted record.
    fn decode(&self, record: &AnnotationRecord) -> Result<Shape, AnnotationError> {
        Shape::from_record(self.geometry(), &record.geometry)
            .ok_or_else(|| AnnotationError::shape_mismatch(self.tag(), self.geometry().name()))
    }
}

/// A kind fully described by its tag and geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinKind {
    pub tag: &'static str,
    pub display_name: &'static str,
    pub geometry: Geometry,
}

impl BuiltinKind {
    pub const fn new(tag: &'static str, display_name: &'static str, geometry: Geometry) -> Self {
        Self {
            tag,
            display_name,
            geometry,
        }
    }
}

impl AnnotationKind for BuiltinKind {
    fn tag(&self) -> &str {
        self.tag
    }

    fn display_name(&self) -> &str {
        self.display_name
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }
}

const BUILTIN_KINDS: [BuiltinKind; 7] = [
    BuiltinKind::new(POINT, "Point", Geometry::Point),
    BuiltinKind::new(LINE, "Line", Geometry::Line),
    BuiltinKind::new(RECTANGLE, "Rectangle", Geometry::Rectangle),
    BuiltinKind::new(POINT2_REAL, "Point2 (REAL)", Geometry::Point),
    BuiltinKind::new(POINT2_LREAL, "Point2 (LREAL)", Geometry::Point),
    BuiltinKind::new(VECTOR4_DINT, "Vector4 (DINT)", Geometry::Line),
    BuiltinKind::new(RECTANGLE_DINT, "Rectangle (DINT)", Geometry::Rectangle),
];

/// Registry of available annotation kinds, in registration order.
pub struct KindRegistry {
    kinds: HashMap<String, Box<dyn AnnotationKind>>,
    order: Vec<String>,
}

impl KindRegistry {
    /// Create a registry with all built-in kinds registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for kind in BUILTIN_KINDS {
            registry.register(Box::new(kind));
        }
        registry
    }

    /// Create a registry with no kinds.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a kind. A kind with the same tag is replaced in place.
    pub fn register(&mut self, kind: Box<dyn AnnotationKind>) {
        let tag = kind.tag().to_string();
        if self.kinds.insert(tag.clone(), kind).is_none() {
            self.order.push(tag);
        } else {
            log::debug!("Replaced annotation kind '{}'", tag);
        }
    }

    pub fn get(&self, tag: &str) -> Option<&dyn AnnotationKind> {
        self.kinds.get(tag).map(|k| k.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// All kinds in registration order.
    pub fn kinds(&self) -> Vec<&dyn AnnotationKind> {
        self.order.iter().filter_map(|tag| self.get(tag)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rebuild one annotation from its record.
    pub fn decode(&self, record: &AnnotationRecord) -> Result<Annotation, AnnotationError> {
        let kind = self
            .get(&record.kind)
            .ok_or_else(|| AnnotationError::unknown_kind(&record.kind))?;
        Ok(Annotation::new(kind.tag(), kind.decode(record)?))
    }

    /// Load a JSON array of records.
    ///
    /// A malformed document is an error. Individual entries that cannot be
    /// decoded (unknown kind, wrong fields) are logged and skipped.
    pub fn load_json(&self, json: &str) -> Result<Vec<Annotation>, AnnotationError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = entries.len();

        let annotations: Vec<Annotation> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let decoded = serde_json::from_value::<AnnotationRecord>(entry)
                    .map_err(AnnotationError::from)
                    .and_then(|record| self.decode(&record));
                match decoded {
                    Ok(annotation) => Some(annotation),
                    Err(e) => {
                        log::warn!("Skipping annotation {}: {}", index, e);
                        None
                    }
                }
            })
            .collect();

        log::debug!("Loaded {} of {} annotations", annotations.len(), total);
        Ok(annotations)
    }

    /// Create a creation tool for a registered kind.
    pub fn create_tool<M>(&self, tag: &str, on_finish: Callback<Annotation, M>) -> Option<ShapeTool<M>> {
        let kind = self.get(tag)?;
        Some(ShapeTool::new(kind.tag(), kind.geometry(), on_finish))
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRegistry").field("kinds", &self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::list_to_json;
    use crate::geometry::ImagePoint;

    fn p(x: f32, y: f32) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = KindRegistry::new();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.get(POINT2_REAL).map(|k| k.geometry()), Some(Geometry::Point));
        assert_eq!(registry.get(VECTOR4_DINT).map(|k| k.geometry()), Some(Geometry::Line));
        assert_eq!(
            registry.get(RECTANGLE_DINT).map(|k| k.geometry()),
            Some(Geometry::Rectangle)
        );
        let tags: Vec<&str> = registry.kinds().iter().map(|k| k.tag()).collect();
        assert_eq!(&tags[..3], &[POINT, LINE, RECTANGLE]);
    }

    #[test]
    fn test_round_trip_all_geometries() {
        let registry = KindRegistry::new();
        let annotations = vec![
            Annotation::point(POINT2_LREAL, p(3.0, 4.0)),
            Annotation::line(LINE, p(1.0, 2.0), p(30.0, 40.0)),
            Annotation::rectangle(RECTANGLE_DINT, p(10.0, 10.0), p(0.0, 5.0)),
        ];
        let json = list_to_json(&annotations).unwrap();
        assert_eq!(registry.load_json(&json).unwrap(), annotations);

        for a in &annotations {
            let single = format!("[{}]", a.to_json().unwrap());
            assert_eq!(registry.load_json(&single).unwrap(), vec![a.clone()]);
        }
    }

    #[test]
    fn test_unknown_kind_is_skipped() {
        let registry = KindRegistry::new();
        let json = r#"[
            {"kind":"ellipse","coord":{"imgX":1,"imgY":1}},
            {"kind":"point","coord":{"imgX":2,"imgY":3}},
            {"kind":"line","coord":{"imgX":2,"imgY":3}},
            42
        ]"#;
        let loaded = registry.load_json(json).unwrap();
        assert_eq!(loaded, vec![Annotation::point(POINT, p(2.0, 3.0))]);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let registry = KindRegistry::new();
        assert!(matches!(registry.load_json("{not json"), Err(AnnotationError::Json(_))));
    }

    #[test]
    fn test_custom_kind_registration() {
        struct Crosshair;
        impl AnnotationKind for Crosshair {
            fn tag(&self) -> &str {
                "crosshair"
            }
            fn display_name(&self) -> &str {
                "Crosshair"
            }
            fn geometry(&self) -> Geometry {
                Geometry::Point
            }
        }

        let mut registry = KindRegistry::empty();
        assert!(registry.is_empty());
        registry.register(Box::new(Crosshair));
        let loaded = registry
            .load_json(r#"[{"type":"crosshair","coord":{"imgX":5,"imgY":6}}]"#)
            .unwrap();
        assert_eq!(loaded[0].kind(), "crosshair");

        let tool = registry.create_tool::<()>("crosshair", Callback::none());
        assert_eq!(tool.map(|t| t.geometry()), Some(Geometry::Point));
        assert!(registry.create_tool::<()>("missing", Callback::none()).is_none());
    }
}
