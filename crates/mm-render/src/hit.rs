//! Hit testing: point → node lookup.
//!
//! Walks the frame in reverse paint order so the topmost node wins when
//! boxes overlap.

use crate::frame::FrameSnapshot;
use kurbo::{Point, Rect};
use mm_core::NodeId;

/// Find the topmost node containing `p` (content space).
/// Returns `None` for the background.
pub fn hit_test(frame: &FrameSnapshot, p: Point) -> Option<NodeId> {
    frame
        .nodes
        .iter()
        .rev()
        .find(|n| contains(n.rect, p))
        .map(|n| n.id)
}

/// Convenience wrapper for a screen-space point.
pub fn hit_test_screen(frame: &FrameSnapshot, screen: Point) -> Option<NodeId> {
    hit_test(frame, frame.transform.screen_to_content(screen))
}

/// All nodes whose boxes intersect `area` (content space), in paint order.
pub fn hit_test_rect(frame: &FrameSnapshot, area: Rect) -> Vec<NodeId> {
    let area = area.abs();
    frame
        .nodes
        .iter()
        .filter(|n| {
            n.rect.x0 <= area.x1 && n.rect.x1 >= area.x0 && n.rect.y0 <= area.y1 && n.rect.y1 >= area.y0
        })
        .map(|n| n.id)
        .collect()
}

/// Inclusive containment, so a press on the border still grabs the node.
fn contains(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}
