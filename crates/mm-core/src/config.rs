//! Tunable constants for the canvas.
//!
//! Every magic number the viewport, layout, fit and connector code relies on
//! lives in [`CanvasConfig`]. The defaults reproduce the stock canvas; hosts
//! may override any subset by passing a partial JSON object.

use crate::transform::ScaleRange;
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration shared by the transform model, layout engine, bounds fit
/// and connector renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Allowed zoom range. Default: **[0.1, 3.0]**.
    pub scale_range: ScaleRange,

    /// Multiplier applied by the zoom-in button. Default: **1.2**.
    pub zoom_in_factor: f64,

    /// Multiplier applied by the zoom-out button. Default: **0.8**.
    pub zoom_out_factor: f64,

    /// Scale change per wheel `deltaY` unit (negated). Default: **0.001**.
    pub wheel_sensitivity: f64,

    /// Screen-space margin kept around content by fit-to-screen. Default: **50**.
    pub fit_padding: f64,

    /// Fit-to-screen never zooms in past this. Default: **1.5**.
    pub fit_max_scale: f64,

    /// Content-space width of every node. Default: **384**.
    pub node_width: f64,

    /// Height used for nodes the rendering layer has not measured yet. Default: **200**.
    pub fallback_height: f64,

    /// Vertical distance from a parent's top edge to its children's. Default: **300**.
    pub child_offset_y: f64,

    /// Horizontal gap between sibling nodes. Default: **40**.
    pub sibling_gap: f64,

    /// Connector control-point offset as a fraction of the horizontal span. Default: **0.3**.
    pub curve_tension: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            scale_range: ScaleRange::DEFAULT,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
            wheel_sensitivity: 0.001,
            fit_padding: 50.0,
            fit_max_scale: 1.5,
            node_width: 384.0,
            fallback_height: 200.0,
            child_offset_y: 300.0,
            sibling_gap: 40.0,
            curve_tension: 0.3,
        }
    }
}

/// Rejected configuration input.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid canvas config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid canvas config: {0}")]
    Invalid(String),
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value would break the canvas invariants.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the geometry code divides by or clamps against.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let range = self.scale_range;
        if !(range.min.is_finite() && range.max.is_finite()) || range.min <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scaleRange must be finite and positive, got [{}, {}]",
                range.min, range.max
            )));
        }
        if range.min > range.max {
            return Err(ConfigError::Invalid(format!(
                "scaleRange.min ({}) exceeds scaleRange.max ({})",
                range.min, range.max
            )));
        }
        let positive = [
            ("zoomInFactor", self.zoom_in_factor),
            ("zoomOutFactor", self.zoom_out_factor),
            ("fitMaxScale", self.fit_max_scale),
            ("nodeWidth", self.node_width),
            ("fallbackHeight", self.fallback_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("wheelSensitivity", self.wheel_sensitivity),
            ("fitPadding", self.fit_padding),
            ("siblingGap", self.sibling_gap),
            ("curveTension", self.curve_tension),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.child_offset_y.is_finite() {
            return Err(ConfigError::Invalid("childOffsetY must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CanvasConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scale_range.min, 0.1);
        assert_eq!(config.scale_range.max, 3.0);
        assert_eq!(config.node_width, 384.0);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = CanvasConfig::from_json(r#"{"fitPadding": 80, "siblingGap": 10}"#).unwrap();
        assert_eq!(config.fit_padding, 80.0);
        assert_eq!(config.sibling_gap, 10.0);
        assert_eq!(config.zoom_in_factor, 1.2);
        assert_eq!(config.fallback_height, 200.0);
    }

    #[test]
    fn inverted_scale_range_is_rejected() {
        let err = CanvasConfig::from_json(r#"{"scaleRange": {"min": 4.0, "max": 2.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = CanvasConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn zero_node_width_is_rejected() {
        let err = CanvasConfig::from_json(r#"{"nodeWidth": 0}"#).unwrap_err();
        assert!(err.to_string().contains("nodeWidth"), "{err}");
    }
}
