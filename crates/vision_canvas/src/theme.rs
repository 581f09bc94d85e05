//! Annotation theme.
//!
//! Styles are read-only constants shared by every display instance. Hit-test
//! thresholds are derived from handle sizes so what you see is what you grab.

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

/// Style for a square drag handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleStyle {
    /// Edge length of the handle square in canvas pixels.
    pub size: f32,
    pub stroke: Color,
    pub selected_stroke: Color,
    pub fill: Color,
    pub line_width: f32,
}

impl HandleStyle {
    pub fn stroke_for(&self, selected: bool) -> Color {
        if selected {
            self.selected_stroke
        } else {
            self.stroke
        }
    }
}

/// Two-pass dashed stroke: background color under a dashed foreground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashStyle {
    /// Dash and gap length in canvas pixels.
    pub dash: [f32; 2],
    pub foreground: Color,
    pub background: Color,
    pub selected_foreground: Color,
    pub selected_background: Color,
    pub line_width: f32,
}

impl DashStyle {
    /// `(foreground, background)` for the current selection state.
    pub fn colors(&self, selected: bool) -> (Color, Color) {
        if selected {
            (self.selected_foreground, self.selected_background)
        } else {
            (self.foreground, self.background)
        }
    }
}

/// Crosshair marker plus handle square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub cross_length: f32,
    pub cross_width: f32,
    pub cross_color: Color,
    pub handle: HandleStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub stroke: DashStyle,
    pub handle: HandleStyle,
}

/// All annotation styles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationTheme {
    pub point: PointStyle,
    pub line: ShapeStyle,
    pub rectangle: ShapeStyle,
    /// Extra slack around a handle that still counts as a hit.
    pub hit_tolerance: f32,
}

const HANDLE: HandleStyle = HandleStyle {
    size: 9.0,
    stroke: Color::BLACK,
    selected_stroke: Color::CYAN,
    fill: Color::new(1.0, 1.0, 1.0, 0.5),
    line_width: 1.0,
};

const DASH: DashStyle = DashStyle {
    dash: [6.0, 6.0],
    foreground: Color::BLACK,
    background: Color::WHITE,
    selected_foreground: Color::BLACK,
    selected_background: Color::CYAN,
    line_width: 1.0,
};

impl AnnotationTheme {
    pub const DEFAULT: AnnotationTheme = AnnotationTheme {
        point: PointStyle {
            cross_length: 7.0,
            cross_width: 1.0,
            cross_color: Color::BLACK,
            handle: HANDLE,
        },
        line: ShapeStyle {
            stroke: DASH,
            handle: HANDLE,
        },
        rectangle: ShapeStyle {
            stroke: DASH,
            handle: HANDLE,
        },
        hit_tolerance: 2.0,
    };

    /// Hit radius for a handle: half its size plus the tolerance.
    pub fn hit_threshold(&self, handle: &HandleStyle) -> f32 {
        handle.size / 2.0 + self.hit_tolerance
    }
}

impl Default for AnnotationTheme {
    fn default() -> Self {
        Self::DEFAULT
    }
}
