//! Per-node drag state machine.
//!
//! `Idle --down(primary)--> Dragging --move--> Dragging --up/cancel--> Idle`.
//!
//! While dragging, the node's position is a preview only: screen movement
//! since the press is divided by the current view scale and added to the
//! node's position at press time. The store sees the result once, as a
//! [`DragCommit`], when the pointer goes up or is cancelled.

use crate::input::{PointerButton, PointerCapture, PointerId};
use kurbo::Point;
use mm_core::{NodeId, ViewTransform};
use serde::Serialize;

/// Live state of one drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer: PointerId,
    /// Pointer position at press, surface-relative.
    pub start_screen: Point,
    /// Node top-left at press, content space.
    pub node_start: Point,
    /// Latest preview position, content space.
    pub current: Point,
}

impl DragSession {
    fn position_for(&self, screen: Point, view: &ViewTransform) -> Point {
        self.node_start + view.screen_delta_to_content(screen - self.start_screen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Final position of a finished drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragCommit {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct NodeDragHandler {
    id: NodeId,
    state: DragState,
}

impl NodeDragHandler {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            state: DragState::Idle,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Preview position while dragging.
    pub fn preview(&self) -> Option<Point> {
        match &self.state {
            DragState::Dragging(s) => Some(s.current),
            DragState::Idle => None,
        }
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        match &self.state {
            DragState::Dragging(s) => Some(s.pointer),
            DragState::Idle => None,
        }
    }

    /// Start a drag. Returns `true` when the event is consumed by the node.
    ///
    /// Only the primary button drags. A second pointer pressed on a node that
    /// is already being dragged is consumed and otherwise ignored.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        button: PointerButton,
        screen: Point,
        node_position: Point,
        capture: &mut dyn PointerCapture,
    ) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        if self.is_dragging() {
            log::trace!("drag {}: ignoring extra {pointer}", self.id);
            return true;
        }
        if let Err(err) = capture.capture(pointer) {
            log::warn!("drag {}: {err}", self.id);
        }
        self.state = DragState::Dragging(DragSession {
            pointer,
            start_screen: screen,
            node_start: node_position,
            current: node_position,
        });
        log::debug!("drag {} start at {node_position:?}", self.id);
        true
    }

    /// Update the preview. `view` is the canvas transform at the time of the move.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        screen: Point,
        view: &ViewTransform,
    ) -> Option<Point> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        if session.pointer != pointer {
            return None;
        }
        session.current = session.position_for(screen, view);
        Some(session.current)
    }

    /// Finish the drag at the release position.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        screen: Point,
        view: &ViewTransform,
        capture: &mut dyn PointerCapture,
    ) -> Option<DragCommit> {
        let DragState::Dragging(session) = self.state else {
            return None;
        };
        if session.pointer != pointer {
            return None;
        }
        Some(self.finish(session.position_for(screen, view), pointer, capture))
    }

    /// Finish the drag at the last previewed position.
    pub fn pointer_cancel(
        &mut self,
        pointer: PointerId,
        capture: &mut dyn PointerCapture,
    ) -> Option<DragCommit> {
        match self.state {
            DragState::Dragging(session) if session.pointer == pointer => {
                Some(self.finish(session.current, pointer, capture))
            }
            _ => None,
        }
    }

    /// Cancel whatever pointer is dragging (Escape, node removal).
    pub fn cancel(&mut self, capture: &mut dyn PointerCapture) -> Option<DragCommit> {
        let pointer = self.active_pointer()?;
        self.pointer_cancel(pointer, capture)
    }

    fn finish(
        &mut self,
        position: Point,
        pointer: PointerId,
        capture: &mut dyn PointerCapture,
    ) -> DragCommit {
        self.state = DragState::Idle;
        if let Err(err) = capture.release(pointer) {
            // Expected when the element was unmounted mid-drag.
            log::debug!("drag {}: release ignored: {err}", self.id);
        }
        log::debug!("drag {} commit at {position:?}", self.id);
        DragCommit {
            id: self.id,
            x: position.x,
            y: position.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CaptureError, NoCapture};
    use pretty_assertions::assert_eq;

    /// Records calls and fails every release.
    #[derive(Default)]
    struct Detached {
        captured: Vec<PointerId>,
        releases: usize,
    }

    impl PointerCapture for Detached {
        fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
            self.captured.push(pointer);
            Ok(())
        }

        fn release(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
            self.releases += 1;
            Err(CaptureError::InactivePointer(pointer))
        }
    }

    fn handler() -> NodeDragHandler {
        NodeDragHandler::new(NodeId::intern("drag_node"))
    }

    #[test]
    fn drag_delta_is_divided_by_scale() {
        let mut h = handler();
        let pointer = PointerId(1);
        assert!(h.pointer_down(
            pointer,
            PointerButton::Primary,
            Point::new(100.0, 100.0),
            Point::new(500.0, 500.0),
            &mut NoCapture,
        ));
        // Translation plays no part in a drag delta.
        let view = ViewTransform::new(-300.0, 75.0, 2.0);
        let preview = h.pointer_move(pointer, Point::new(160.0, 80.0), &view).unwrap();
        assert_eq!(preview, Point::new(530.0, 490.0));

        let commit = h
            .pointer_up(pointer, Point::new(200.0, 100.0), &view, &mut NoCapture)
            .unwrap();
        assert_eq!((commit.x, commit.y), (550.0, 500.0));
        assert!(!h.is_dragging());
    }

    #[test]
    fn secondary_button_is_not_consumed() {
        let mut h = handler();
        assert!(!h.pointer_down(
            PointerId(1),
            PointerButton::Secondary,
            Point::ORIGIN,
            Point::ORIGIN,
            &mut NoCapture,
        ));
        assert_eq!(h.state(), &DragState::Idle);
    }

    #[test]
    fn cancel_commits_last_preview_once_and_swallows_release_errors() {
        let mut h = handler();
        let mut cap = Detached::default();
        let pointer = PointerId(7);
        h.pointer_down(
            pointer,
            PointerButton::Primary,
            Point::ORIGIN,
            Point::new(10.0, 10.0),
            &mut cap,
        );
        assert_eq!(cap.captured, vec![pointer]);
        h.pointer_move(pointer, Point::new(5.0, 0.0), &ViewTransform::IDENTITY);

        let commit = h.pointer_cancel(pointer, &mut cap).unwrap();
        assert_eq!((commit.x, commit.y), (15.0, 10.0));
        assert_eq!(cap.releases, 1);

        // The session is over: no second commit.
        assert_eq!(h.pointer_cancel(pointer, &mut cap), None);
        assert_eq!(
            h.pointer_up(pointer, Point::ORIGIN, &ViewTransform::IDENTITY, &mut cap),
            None
        );
    }

    #[test]
    fn other_pointers_do_not_move_the_node() {
        let mut h = handler();
        h.pointer_down(
            PointerId(1),
            PointerButton::Primary,
            Point::ORIGIN,
            Point::ORIGIN,
            &mut NoCapture,
        );
        assert!(h.pointer_down(
            PointerId(2),
            PointerButton::Primary,
            Point::ORIGIN,
            Point::ORIGIN,
            &mut NoCapture,
        ));
        assert_eq!(
            h.pointer_move(PointerId(2), Point::new(50.0, 50.0), &ViewTransform::IDENTITY),
            None
        );
        assert_eq!(h.active_pointer(), Some(PointerId(1)));
    }
}
