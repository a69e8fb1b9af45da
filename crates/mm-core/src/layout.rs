//! Placement of new child nodes under their parent.
//!
//! Children go in a row a fixed distance below the parent. The row is
//! `count * node_width + (count - 1) * gap` wide and centred under the
//! parent's horizontal centre; the new child takes the next free slot.
//! Placement depends only on how many siblings exist when the child is
//! created, so removing a sibling never moves the others. Earlier siblings
//! are never shifted either, so children added one at a time can overlap;
//! `row_slots` gives overlap-free positions for a batch placed together.

use crate::config::CanvasConfig;
use crate::model::Node;
use crate::store::NodeStore;
use kurbo::Point;

/// Top-left position for the next child of `parent`.
pub fn place_child(parent: &Node, store: &NodeStore, config: &CanvasConfig) -> Point {
    let existing = store.children_of(parent.id).count();
    let pos = slot_in_row(parent, existing, existing + 1, config);
    log::debug!(
        "placing child #{} of {} at ({}, {})",
        existing + 1,
        parent.id,
        pos.x,
        pos.y
    );
    pos
}

/// Top-left positions for a full row of `count` children under `parent`,
/// left to right. Adjacent slots are exactly `node_width + gap` apart.
pub fn row_slots(parent: &Node, count: usize, config: &CanvasConfig) -> Vec<Point> {
    (0..count)
        .map(|index| slot_in_row(parent, index, count, config))
        .collect()
}

fn slot_in_row(parent: &Node, index: usize, count: usize, config: &CanvasConfig) -> Point {
    let width = config.node_width;
    let gap = config.sibling_gap;
    let n = count as f64;
    let group_width = n * width + (n - 1.0) * gap;
    let start_x = parent.x + width / 2.0 - group_width / 2.0;
    Point::new(
        start_x + index as f64 * (width + gap),
        parent.y + config.child_offset_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::NodeKind;
    use pretty_assertions::assert_eq;

    fn parent() -> Node {
        Node::new(NodeId::intern("layout_parent"), NodeKind::Prompt, "root").at(1000.0, 200.0)
    }

    #[test]
    fn first_child_sits_directly_below() {
        let config = CanvasConfig::default();
        let p = parent();
        let store = NodeStore::from_nodes([p.clone()]).unwrap();
        assert_eq!(place_child(&p, &store, &config), Point::new(1000.0, 500.0));
    }

    #[test]
    fn second_child_takes_the_right_slot_of_a_two_wide_row() {
        let config = CanvasConfig::default();
        let p = parent();
        let first = Node::new(NodeId::intern("layout_c1"), NodeKind::AiResponse, "")
            .with_parent(p.id)
            .at(1000.0, 500.0);
        let store = NodeStore::from_nodes([p.clone(), first]).unwrap();
        // Row of two: 2*384 + 40 = 808 wide, centred on x = 1192.
        assert_eq!(place_child(&p, &store, &config), Point::new(1212.0, 500.0));
    }

    #[test]
    fn unrelated_nodes_do_not_count_as_siblings() {
        let config = CanvasConfig::default();
        let p = parent();
        let stranger = Node::new(NodeId::intern("layout_stranger"), NodeKind::Prompt, "");
        let store = NodeStore::from_nodes([p.clone(), stranger]).unwrap();
        assert_eq!(place_child(&p, &store, &config).x, 1000.0);
    }

    #[test]
    fn one_at_a_time_children_keep_their_slots_and_may_overlap() {
        let config = CanvasConfig::default();
        let p = Node::new(NodeId::intern("layout_seq_parent"), NodeKind::Prompt, "");
        let mut store = NodeStore::from_nodes([p.clone()]).unwrap();
        let mut xs = Vec::new();
        for i in 0..3 {
            let pos = place_child(&p, &store, &config);
            xs.push(pos.x);
            let child = Node::new(
                NodeId::intern(&format!("layout_seq_c{i}")),
                NodeKind::AiResponse,
                "",
            )
            .with_parent(p.id)
            .at(pos.x, pos.y);
            store.add_node(child).unwrap();
        }
        assert_eq!(xs, vec![0.0, 212.0, 424.0]);
        // 212 < 0 + 384: the second child overlaps the first.
        assert!(xs[1] < xs[0] + config.node_width);
    }

    #[test]
    fn row_is_centred_and_never_overlaps() {
        let config = CanvasConfig::default();
        let p = parent();
        for count in 1..=7 {
            let slots = row_slots(&p, count, &config);
            assert_eq!(slots.len(), count);
            for pair in slots.windows(2) {
                let right_edge = pair[0].x + config.node_width;
                assert!(
                    pair[1].x >= right_edge,
                    "slots overlap for {count} children: {pair:?}"
                );
            }
            let left = slots[0].x;
            let right = slots[count - 1].x + config.node_width;
            let centre = (left + right) / 2.0;
            assert!((centre - (p.x + config.node_width / 2.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_row_has_no_slots() {
        assert!(row_slots(&parent(), 0, &CanvasConfig::default()).is_empty());
    }
}
