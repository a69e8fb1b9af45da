//! Frame snapshot → Vello drawing commands.
//!
//! Paints connectors first, then node cards in store order, all under the
//! view transform. Card contents (text, media) are drawn by the host on top;
//! this layer only provides the outlines and edges.

use crate::frame::{FrameSnapshot, NodeFrame};
use kurbo::{Affine, BezPath, Cap, Join, Shape, Stroke};
use mm_core::NodeKind;
use mm_core::connector::Connector;
use peniko::{Color, Fill};
use vello::Scene;

/// Colours and stroke widths for the canvas.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub connector: Color,
    pub connector_width: f64,
    /// Dash pattern for edges leading into a loading placeholder.
    pub pending_dash: [f64; 2],
    pub card_fill: Color,
    pub card_outline: Color,
    pub prompt_outline: Color,
    pub error_outline: Color,
    pub outline_width: f64,
    pub corner_radius: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            connector: Color::from_rgba8(148, 163, 184, 255),
            connector_width: 2.0,
            pending_dash: [6.0, 6.0],
            card_fill: Color::from_rgba8(255, 255, 255, 255),
            card_outline: Color::from_rgba8(226, 232, 240, 255),
            prompt_outline: Color::from_rgba8(99, 102, 241, 255),
            error_outline: Color::from_rgba8(239, 68, 68, 255),
            outline_width: 1.0,
            corner_radius: 12.0,
        }
    }
}

impl Theme {
    fn outline_for(&self, kind: NodeKind) -> Color {
        match kind {
            NodeKind::Prompt => self.prompt_outline,
            NodeKind::Error => self.error_outline,
            _ => self.card_outline,
        }
    }
}

/// Paint one frame into `scene`.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_frame(scene: &mut Scene, frame: &FrameSnapshot, theme: &Theme) {
    let view = frame.transform.to_affine();

    for connector in &frame.connectors {
        paint_connector(scene, view, connector, frame.is_pending_connector(connector), theme);
    }
    for node in &frame.nodes {
        paint_card(scene, view, node, theme);
    }
}

// ─── Painters ────────────────────────────────────────────────────────────────

fn paint_connector(scene: &mut Scene, view: Affine, connector: &Connector, pending: bool, theme: &Theme) {
    let path = connector_path(connector);
    let mut stroke = Stroke::new(theme.connector_width)
        .with_caps(Cap::Round)
        .with_join(Join::Round);
    if pending {
        stroke = stroke.with_dashes(0.0, theme.pending_dash);
    }
    scene.stroke(&stroke, view, theme.connector, None, &path);
}

fn paint_card(scene: &mut Scene, view: Affine, node: &NodeFrame, theme: &Theme) {
    let shape = node.rect.to_rounded_rect(theme.corner_radius);
    scene.fill(Fill::NonZero, view, theme.card_fill, None, &shape);

    let mut stroke = Stroke::new(theme.outline_width);
    if node.kind == NodeKind::Loading {
        stroke = stroke.with_dashes(0.0, theme.pending_dash);
    }
    scene.stroke(&stroke, view, theme.outline_for(node.kind), None, &shape);
    log::trace!("card {} {} at {:?}", node.kind.as_str(), node.id, node.rect);
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// The connector curve as a path (content space).
pub fn connector_path(connector: &Connector) -> BezPath {
    connector.curve().into_path(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};
    use mm_core::NodeId;

    #[test]
    fn connector_path_is_one_cubic() {
        let c = Connector {
            parent: NodeId::intern("paint_p"),
            child: NodeId::intern("paint_c"),
            from: Point::new(0.0, 0.0),
            to: Point::new(100.0, 300.0),
            anchors: None,
            tension: 0.3,
        };
        let els: Vec<PathEl> = connector_path(&c).elements().to_vec();
        assert_eq!(els.len(), 2);
        assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(
            els[1],
            PathEl::CurveTo(Point::new(30.0, 0.0), Point::new(70.0, 300.0), Point::new(100.0, 300.0))
        );
    }
}
