//! Parent → child connector geometry.
//!
//! Each node exposes four anchors (top, bottom, left and right edge
//! midpoints). A connector joins the closest parent/child anchor pair with a
//! cubic curve whose control points sit on the endpoints' own y, pulled
//! towards each other by `curve_tension` of the horizontal span.
//!
//! Anchor boxes use the fixed node width and the rendered height, the same
//! box the frame draws and hit-tests. When either end has not been measured
//! yet, the raw top-left positions are used as endpoints instead.

use crate::config::CanvasConfig;
use crate::id::NodeId;
use crate::measure::NodeMetrics;
use crate::model::Node;
use crate::store::NodeStore;
use kurbo::{CubicBez, Point, Rect, Size};
use serde::Serialize;
use std::collections::HashMap;

/// One of the four connection points on a node's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Bottom, Anchor::Left, Anchor::Right];

    pub fn point(self, rect: Rect) -> Point {
        let c = rect.center();
        match self {
            Anchor::Top => Point::new(c.x, rect.y0),
            Anchor::Bottom => Point::new(c.x, rect.y1),
            Anchor::Left => Point::new(rect.x0, c.y),
            Anchor::Right => Point::new(rect.x1, c.y),
        }
    }
}

/// The four anchors of `rect`, in [`Anchor::ALL`] order.
pub fn anchor_points(rect: Rect) -> [(Anchor, Point); 4] {
    Anchor::ALL.map(|a| (a, a.point(rect)))
}

/// The parent/child anchor pair with the smallest Euclidean distance.
///
/// All 16 combinations are compared; on a tie the first pair in
/// [`Anchor::ALL`] order wins.
pub fn closest_anchors(parent: Rect, child: Rect) -> ((Anchor, Point), (Anchor, Point)) {
    let parent_anchors = anchor_points(parent);
    let child_anchors = anchor_points(child);
    let mut best = (parent_anchors[0], child_anchors[0]);
    let mut best_dist = f64::INFINITY;
    for p in parent_anchors {
        for c in child_anchors {
            let d = p.1.distance_squared(c.1);
            if d < best_dist {
                best_dist = d;
                best = (p, c);
            }
        }
    }
    best
}

/// A drawable connector between a parent and one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub parent: NodeId,
    pub child: NodeId,
    /// Endpoint on the parent, content space.
    pub from: Point,
    /// Endpoint on the child, content space.
    pub to: Point,
    /// Chosen anchors, `None` when an end was unmeasured.
    pub anchors: Option<(Anchor, Anchor)>,
    pub tension: f64,
}

/// One end of a connector: where the node is drawn and, if measured, its box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub id: NodeId,
    pub position: Point,
    pub rect: Option<Rect>,
}

impl Endpoint {
    /// Endpoint for `node` drawn at `position`: the fixed node width and the
    /// measured height, or no box at all while the node is unmeasured.
    pub fn measure(
        node: &Node,
        position: Point,
        metrics: &dyn NodeMetrics,
        config: &CanvasConfig,
    ) -> Self {
        Self {
            id: node.id,
            position,
            rect: metrics.rendered_height(node.id).map(|height| {
                Rect::from_origin_size(position, Size::new(config.node_width, height))
            }),
        }
    }
}

impl Connector {
    pub fn between(parent: Endpoint, child: Endpoint, tension: f64) -> Self {
        let (from, to, anchors) = match (parent.rect, child.rect) {
            (Some(pr), Some(cr)) => {
                let ((pa, pp), (ca, cp)) = closest_anchors(pr, cr);
                (pp, cp, Some((pa, ca)))
            }
            _ => (parent.position, child.position, None),
        };
        Self {
            parent: parent.id,
            child: child.id,
            from,
            to,
            anchors,
            tension,
        }
    }

    /// The S-curve from parent to child.
    pub fn curve(&self) -> CubicBez {
        let offset = (self.to.x - self.from.x) * self.tension;
        CubicBez::new(
            self.from,
            Point::new(self.from.x + offset, self.from.y),
            Point::new(self.to.x - offset, self.to.y),
            self.to,
        )
    }
}

/// Connectors for every node whose parent still exists, in node order.
///
/// `overrides` replaces stored positions (e.g. nodes mid-drag) so edges track
/// what is on screen rather than what is committed.
pub fn connectors(
    store: &NodeStore,
    metrics: &dyn NodeMetrics,
    overrides: &HashMap<NodeId, Point>,
    config: &CanvasConfig,
) -> Vec<Connector> {
    let drawn_at = |node: &Node| {
        overrides
            .get(&node.id)
            .copied()
            .unwrap_or_else(|| node.position())
    };

    let mut out = Vec::new();
    for child in store.iter() {
        let Some(parent_id) = child.parent_id else {
            continue;
        };
        let Some(parent) = store.get(parent_id) else {
            log::trace!("no connector for {}: parent {parent_id} is gone", child.id);
            continue;
        };
        out.push(Connector::between(
            Endpoint::measure(parent, drawn_at(parent), metrics, config),
            Endpoint::measure(child, drawn_at(child), metrics, config),
            config.curve_tension,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{NoMetrics, SizeRegistry};
    use crate::model::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn stacked_nodes_connect_bottom_to_top() {
        let parent = Rect::new(0.0, 0.0, 384.0, 100.0);
        let child = Rect::new(0.0, 300.0, 384.0, 400.0);
        let ((pa, pp), (ca, cp)) = closest_anchors(parent, child);
        assert_eq!((pa, pp), (Anchor::Bottom, Point::new(192.0, 100.0)));
        assert_eq!((ca, cp), (Anchor::Top, Point::new(192.0, 300.0)));
    }

    #[test]
    fn side_by_side_nodes_connect_right_to_left() {
        let parent = Rect::new(0.0, 0.0, 384.0, 100.0);
        let child = Rect::new(600.0, 20.0, 984.0, 120.0);
        let ((pa, _), (ca, _)) = closest_anchors(parent, child);
        assert_eq!((pa, ca), (Anchor::Right, Anchor::Left));
    }

    #[test]
    fn chosen_pair_is_globally_minimal() {
        let parent = Rect::new(-50.0, 10.0, 334.0, 260.0);
        let child = Rect::new(400.0, 500.0, 784.0, 580.0);
        let ((_, pp), (_, cp)) = closest_anchors(parent, child);
        let chosen = pp.distance(cp);
        for (_, a) in anchor_points(parent) {
            for (_, b) in anchor_points(child) {
                assert!(chosen <= a.distance(b) + 1e-9);
            }
        }
    }

    #[test]
    fn curve_control_points_are_horizontal() {
        let c = Connector {
            parent: NodeId::intern("conn_p"),
            child: NodeId::intern("conn_c"),
            from: Point::new(0.0, 0.0),
            to: Point::new(100.0, 200.0),
            anchors: None,
            tension: 0.3,
        };
        let bez = c.curve();
        assert_eq!(bez.p0, Point::new(0.0, 0.0));
        assert_eq!(bez.p1, Point::new(30.0, 0.0));
        assert_eq!(bez.p2, Point::new(70.0, 200.0));
        assert_eq!(bez.p3, Point::new(100.0, 200.0));
    }

    #[test]
    fn unmeasured_nodes_fall_back_to_raw_positions() {
        let config = CanvasConfig::default();
        let parent = Node::new(NodeId::intern("conn_fb_p"), NodeKind::Prompt, "").at(10.0, 20.0);
        let child = Node::new(NodeId::intern("conn_fb_c"), NodeKind::AiResponse, "")
            .with_parent(parent.id)
            .at(10.0, 320.0);
        let store = NodeStore::from_nodes([parent, child]).unwrap();

        let out = connectors(&store, &NoMetrics, &HashMap::new(), &config);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].from, Point::new(10.0, 20.0));
        assert_eq!(out[0].to, Point::new(10.0, 320.0));
        assert_eq!(out[0].anchors, None);
    }

    #[test]
    fn anchors_ignore_measured_width() {
        let config = CanvasConfig::default();
        let parent = Node::new(NodeId::intern("conn_w_p"), NodeKind::Prompt, "");
        let child = Node::new(NodeId::intern("conn_w_c"), NodeKind::AiResponse, "")
            .with_parent(parent.id)
            .at(0.0, 300.0);
        let store = NodeStore::from_nodes([parent.clone(), child.clone()]).unwrap();

        // The host reports a wider element than the layout width.
        let mut sizes = SizeRegistry::new();
        sizes.record(parent.id, Size::new(500.0, 100.0));
        sizes.record(child.id, Size::new(500.0, 100.0));

        let out = connectors(&store, &sizes, &HashMap::new(), &config);
        let drawn = crate::bounds::node_rect(&parent, &sizes, &config);
        assert_eq!(drawn, Rect::new(0.0, 0.0, 384.0, 100.0));
        assert_eq!(out[0].from, Point::new(192.0, 100.0));
        assert_eq!(out[0].from, Anchor::Bottom.point(drawn));
        assert_eq!(out[0].to, Point::new(192.0, 300.0));
    }

    #[test]
    fn dangling_parent_draws_nothing_and_overrides_apply() {
        let config = CanvasConfig::default();
        let parent = Node::new(NodeId::intern("conn_ov_p"), NodeKind::Prompt, "");
        let child = Node::new(NodeId::intern("conn_ov_c"), NodeKind::AiResponse, "")
            .with_parent(parent.id)
            .at(0.0, 300.0);
        let orphan = Node::new(NodeId::intern("conn_ov_o"), NodeKind::Error, "")
            .with_parent(NodeId::intern("conn_ov_missing"));
        let store = NodeStore::from_nodes([parent.clone(), child.clone(), orphan]).unwrap();

        let mut sizes = SizeRegistry::new();
        sizes.record(parent.id, Size::new(384.0, 100.0));
        sizes.record(child.id, Size::new(384.0, 100.0));

        let mut overrides = HashMap::new();
        overrides.insert(child.id, Point::new(0.0, 600.0));

        let out = connectors(&store, &sizes, &overrides, &config);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, Point::new(192.0, 600.0));
        assert_eq!(out[0].anchors, Some((Anchor::Bottom, Anchor::Top)));
    }
}
