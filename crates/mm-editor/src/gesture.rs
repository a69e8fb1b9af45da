//! Background pointer gestures: one-finger pan, two-finger pinch, wheel zoom.
//!
//! The resolver owns the set of pointers pressed on the canvas background,
//! in registration order. A move first updates that set and only then
//! classifies the gesture, so classification always sees the event's own
//! position.
//!
//! With three or more pointers down, pinch math uses the two most recently
//! registered pointers; the others are tracked but otherwise ignored.

use crate::input::PointerId;
use kurbo::Point;
use mm_core::{CanvasConfig, ViewTransform};
use smallvec::SmallVec;

/// Pinch distances below this are treated as zero.
const MIN_PINCH_DISTANCE: f64 = 1e-9;

#[derive(Debug, Clone, Default)]
pub struct GestureResolver {
    pointers: SmallVec<[(PointerId, Point); 4]>,
}

impl GestureResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a background pointer at a surface-relative position.
    /// Re-registering a known pointer moves it to the end of the order.
    pub fn pointer_down(&mut self, pointer: PointerId, pos: Point) {
        self.pointers.retain(|(id, _)| *id != pointer);
        self.pointers.push((pointer, pos));
        log::trace!("gesture: {pointer} down, {} active", self.pointers.len());
    }

    /// Track a move and return the resulting transform, or `None` when the
    /// view does not change (unknown pointer, zero-distance pinch, a pointer
    /// outside the pinch pair moved).
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        pos: Point,
        transform: ViewTransform,
        config: &CanvasConfig,
    ) -> Option<ViewTransform> {
        let idx = self.pointers.iter().position(|(id, _)| *id == pointer)?;
        let before = self.pointers.clone();
        self.pointers[idx].1 = pos;

        let n = self.pointers.len();
        if n == 1 {
            let delta = pos - before[idx].1;
            return Some(transform.pan(delta.x, delta.y));
        }

        let (a, b) = (n - 2, n - 1);
        if idx < a {
            return None;
        }
        let (old_a, old_b) = (before[a].1, before[b].1);
        let (new_a, new_b) = (self.pointers[a].1, self.pointers[b].1);

        let old_dist = old_a.distance(old_b);
        if old_dist < MIN_PINCH_DISTANCE {
            log::trace!("gesture: skipping pinch frame with coincident pointers");
            return None;
        }
        let factor = new_a.distance(new_b) / old_dist;
        let old_mid = old_a.midpoint(old_b);
        let new_mid = new_a.midpoint(new_b);
        let shift = new_mid - old_mid;

        Some(transform.pan(shift.x, shift.y).zoom_at_point(
            new_mid,
            transform.scale * factor,
            &config.scale_range,
        ))
    }

    /// Forget a pointer (up or cancel). Unknown pointers are ignored.
    pub fn pointer_up(&mut self, pointer: PointerId) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|(id, _)| *id != pointer);
        let removed = self.pointers.len() != before;
        if removed {
            log::trace!("gesture: {pointer} up, {} active", self.pointers.len());
        }
        removed
    }

    /// Wheel zoom anchored at `focal` (surface-relative).
    pub fn wheel(
        &self,
        focal: Point,
        delta_y: f64,
        transform: ViewTransform,
        config: &CanvasConfig,
    ) -> ViewTransform {
        let target = transform.scale - delta_y * config.wheel_sensitivity;
        transform.zoom_at_point(focal, target, &config.scale_range)
    }

    pub fn active_pointers(&self) -> impl Iterator<Item = PointerId> + '_ {
        self.pointers.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Drop every pointer; returns the ids that were active.
    pub fn clear(&mut self) -> Vec<PointerId> {
        self.pointers.drain(..).map(|(id, _)| id).collect()
    }
}
