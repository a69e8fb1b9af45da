//! Per-frame snapshot of everything the canvas draws.
//!
//! Built once per frame from the store, the measured sizes, the current
//! transform and any drag previews. Hit testing, painting and the wasm
//! bridge all read the same snapshot, so they never disagree about where a
//! node is.

use kurbo::{Point, Rect, Size};
use mm_core::bounds::node_rect;
use mm_core::connector::{Connector, connectors};
use mm_core::{CanvasConfig, NodeId, NodeKind, NodeMetrics, NodeStore, ViewTransform};
use serde::Serialize;
use std::collections::HashMap;

/// One node as it will be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFrame {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Content-space box, at the preview position if the node is mid-drag.
    pub rect: Rect,
    pub screen_rect: Rect,
    /// `false` while the height is still the fallback estimate.
    pub measured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub transform: ViewTransform,
    /// Paint order: the last node is drawn on top.
    pub nodes: Vec<NodeFrame>,
    pub connectors: Vec<Connector>,
}

/// Snapshot the canvas for one frame.
///
/// `overrides` holds drag-preview positions; they move both the node box and
/// the connectors attached to it.
pub fn build_frame(
    store: &NodeStore,
    metrics: &dyn NodeMetrics,
    transform: ViewTransform,
    overrides: &HashMap<NodeId, Point>,
    config: &CanvasConfig,
) -> FrameSnapshot {
    let nodes = store
        .iter()
        .map(|node| {
            let mut rect = node_rect(node, metrics, config);
            if let Some(&preview) = overrides.get(&node.id) {
                rect = rect.with_origin(preview);
            }
            NodeFrame {
                id: node.id,
                kind: node.kind,
                rect,
                screen_rect: transform.content_rect_to_screen(rect),
                measured: metrics.rendered_size(node.id).is_some(),
            }
        })
        .collect::<Vec<_>>();

    let connectors = connectors(store, metrics, overrides, config);
    log::trace!(
        "frame: {} nodes, {} connectors, scale {}",
        nodes.len(),
        connectors.len(),
        transform.scale
    );

    FrameSnapshot {
        transform,
        nodes,
        connectors,
    }
}

impl FrameSnapshot {
    /// Nodes that intersect a `viewport`-sized surface, in paint order.
    pub fn visible_nodes(&self, viewport: Size) -> impl Iterator<Item = &NodeFrame> + '_ {
        let visible = self.transform.visible_content_rect(viewport);
        self.nodes
            .iter()
            .filter(move |n| intersects(n.rect, visible))
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeFrame> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Connectors whose child is still a loading placeholder.
    pub fn is_pending_connector(&self, connector: &Connector) -> bool {
        self.node(connector.child)
            .is_some_and(|n| n.kind == NodeKind::Loading)
    }
}

/// Open-interval overlap; boxes that only touch an edge are not visible.
fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_core::{Node, SizeRegistry};
    use pretty_assertions::assert_eq;

    fn store() -> NodeStore {
        let root = Node::new(NodeId::intern("frame_root"), NodeKind::Prompt, "q");
        let child = Node::new(NodeId::intern("frame_child"), NodeKind::Loading, "")
            .with_parent(root.id)
            .at(0.0, 300.0);
        let far = Node::new(NodeId::intern("frame_far"), NodeKind::AiResponse, "")
            .at(10_000.0, 10_000.0);
        NodeStore::from_nodes([root, child, far]).unwrap()
    }

    #[test]
    fn nodes_follow_store_order_and_transform() {
        let config = CanvasConfig::default();
        let mut sizes = SizeRegistry::new();
        sizes.record(NodeId::intern("frame_root"), Size::new(384.0, 100.0));
        let t = ViewTransform::new(10.0, 20.0, 0.5);

        let frame = build_frame(&store(), &sizes, t, &HashMap::new(), &config);
        let ids: Vec<&str> = frame.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["frame_root", "frame_child", "frame_far"]);

        let root = frame.nodes[0];
        assert!(root.measured);
        assert_eq!(root.rect, Rect::new(0.0, 0.0, 384.0, 100.0));
        assert_eq!(root.screen_rect, Rect::new(10.0, 20.0, 202.0, 70.0));
        assert!(!frame.nodes[1].measured);
        assert_eq!(frame.nodes[1].rect.height(), config.fallback_height);
    }

    #[test]
    fn previews_move_boxes_and_connectors() {
        let config = CanvasConfig::default();
        let mut overrides = HashMap::new();
        overrides.insert(NodeId::intern("frame_child"), Point::new(500.0, 300.0));
        let frame = build_frame(
            &store(),
            &mm_core::NoMetrics,
            ViewTransform::IDENTITY,
            &overrides,
            &config,
        );
        let child = frame.node(NodeId::intern("frame_child")).unwrap();
        assert_eq!(child.rect.origin(), Point::new(500.0, 300.0));
        assert_eq!(frame.connectors.len(), 1);
        assert_eq!(frame.connectors[0].to, Point::new(500.0, 300.0));
        assert!(frame.is_pending_connector(&frame.connectors[0]));
    }

    #[test]
    fn culling_drops_offscreen_nodes() {
        let config = CanvasConfig::default();
        let frame = build_frame(
            &store(),
            &mm_core::NoMetrics,
            ViewTransform::IDENTITY,
            &HashMap::new(),
            &config,
        );
        let visible: Vec<&str> = frame
            .visible_nodes(Size::new(1280.0, 800.0))
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(visible, vec!["frame_root", "frame_child"]);
    }
}
