//! Content bounds and the fit-to-screen transform.

use crate::config::CanvasConfig;
use crate::measure::NodeMetrics;
use crate::model::Node;
use crate::transform::ViewTransform;
use kurbo::{Point, Rect, Size};

/// A node's content-space box: fixed width, measured height (or the fallback
/// height when the node has not been rendered yet).
pub fn node_rect(node: &Node, metrics: &dyn NodeMetrics, config: &CanvasConfig) -> Rect {
    let height = metrics
        .rendered_height(node.id)
        .unwrap_or(config.fallback_height);
    Rect::from_origin_size(node.position(), Size::new(config.node_width, height))
}

/// Union of every node box, or `None` for an empty canvas.
pub fn content_bounds(
    nodes: &[Node],
    metrics: &dyn NodeMetrics,
    config: &CanvasConfig,
) -> Option<Rect> {
    nodes
        .iter()
        .map(|n| node_rect(n, metrics, config))
        .reduce(|acc, r| acc.union(r))
}

/// The transform that fits all nodes inside a `viewport`-sized surface.
///
/// - No nodes: the identity transform.
/// - One node, or a box with no width or height: scale 1 (kept inside the
///   configured scale range) with the box centred in the viewport.
/// - Otherwise: the largest scale that fits the box inside the viewport
///   minus `fit_padding` on every side, capped at `fit_max_scale` and kept
///   inside the configured scale range, with the box centred.
pub fn fit_transform(
    nodes: &[Node],
    metrics: &dyn NodeMetrics,
    viewport: Size,
    config: &CanvasConfig,
) -> ViewTransform {
    let Some(bounds) = content_bounds(nodes, metrics, config) else {
        log::debug!("fit: empty canvas, resetting view");
        return ViewTransform::IDENTITY;
    };

    let degenerate = nodes.len() == 1 || bounds.width() <= 0.0 || bounds.height() <= 0.0;
    let scale = if degenerate {
        config.scale_range.clamp(1.0)
    } else {
        let available_w = (viewport.width - 2.0 * config.fit_padding).max(0.0);
        let available_h = (viewport.height - 2.0 * config.fit_padding).max(0.0);
        let scale_x = available_w / bounds.width();
        let scale_y = available_h / bounds.height();
        config
            .scale_range
            .clamp(scale_x.min(scale_y).min(config.fit_max_scale))
    };

    let transform = center_rect(bounds, scale, viewport);
    log::debug!(
        "fit: {} nodes in {:?} → {:?}",
        nodes.len(),
        bounds,
        transform
    );
    transform
}

/// Centre `rect` (content space) in the viewport at the given scale.
pub fn center_rect(rect: Rect, scale: f64, viewport: Size) -> ViewTransform {
    center_point(rect.center(), scale, viewport)
}

/// Put the content point `p` at the centre of the viewport at the given scale.
pub fn center_point(p: Point, scale: f64, viewport: Size) -> ViewTransform {
    ViewTransform::new(
        viewport.width / 2.0 - p.x * scale,
        viewport.height / 2.0 - p.y * scale,
        scale,
    )
}
