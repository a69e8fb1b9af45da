//! Viewport transform: translation plus uniform scale.
//!
//! A content-space point `p` appears on screen at `p * scale + translate`.
//! Every operation is pure: it takes the current transform by value and
//! returns the next one, so callers decide when to commit.

use crate::config::CanvasConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Inclusive zoom limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub const DEFAULT: Self = Self { min: 0.1, max: 3.0 };

    /// Clamp into the range. Never panics: an inverted range resolves to
    /// `max`, and NaN resolves to `min`.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The canvas viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Shift the view by a screen-space delta. Scale is untouched.
    #[must_use]
    pub fn pan(self, dx: f64, dy: f64) -> Self {
        Self {
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
            scale: self.scale,
        }
    }

    /// Zoom to `new_scale` (clamped into `range`) keeping the content point
    /// under `focal` (screen space) fixed on screen.
    ///
    /// A non-finite target leaves the transform unchanged.
    #[must_use]
    pub fn zoom_at_point(self, focal: Point, new_scale: f64, range: &ScaleRange) -> Self {
        if !new_scale.is_finite() {
            log::warn!("ignoring non-finite zoom target {new_scale}");
            return self;
        }
        let scale = range.clamp(new_scale);
        let ratio = scale / self.scale;
        Self {
            translate_x: focal.x - (focal.x - self.translate_x) * ratio,
            translate_y: focal.y - (focal.y - self.translate_y) * ratio,
            scale,
        }
    }

    /// Button zoom: multiply the scale by `factor`, anchored at the
    /// transform origin rather than a screen point.
    #[must_use]
    pub fn zoom_by(self, factor: f64, range: &ScaleRange) -> Self {
        self.with_scale(self.scale * factor, range)
    }

    /// Zoom-in button: one `zoom_in_factor` step.
    #[must_use]
    pub fn zoom_in(self, config: &CanvasConfig) -> Self {
        self.zoom_by(config.zoom_in_factor, &config.scale_range)
    }

    /// Zoom-out button: one `zoom_out_factor` step.
    #[must_use]
    pub fn zoom_out(self, config: &CanvasConfig) -> Self {
        self.zoom_by(config.zoom_out_factor, &config.scale_range)
    }

    /// Replace the scale (clamped), keeping the translation.
    #[must_use]
    pub fn with_scale(self, scale: f64, range: &ScaleRange) -> Self {
        if !scale.is_finite() {
            return self;
        }
        Self {
            scale: range.clamp(scale),
            ..self
        }
    }

    pub fn content_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    pub fn screen_to_content(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }

    /// Convert a screen-space delta (e.g. pointer movement) into content space.
    pub fn screen_delta_to_content(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    pub fn content_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.content_to_screen(rect.origin()),
            self.content_to_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    /// The content-space region visible through a viewport of `size`.
    pub fn visible_content_rect(&self, size: Size) -> Rect {
        Rect::from_points(
            self.screen_to_content(Point::ORIGIN),
            self.screen_to_content(Point::new(size.width, size.height)),
        )
    }

    /// Content → screen as a kurbo affine, for painting.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation()) * Affine::scale(self.scale)
    }

    /// CSS `transform` value for DOM hosts that position a content layer.
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    /// Zoom level as a whole percentage, for the zoom readout.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round().max(0.0) as u32
    }
}
