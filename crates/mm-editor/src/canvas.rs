//! The canvas controller: routes input to node drags or background gestures
//! and owns the view transform.
//!
//! ## Gesture priority
//!
//! A pointer-down is hit-tested against the current frame. If it lands on a
//! node and that node's drag handler consumes it, the pointer id is claimed
//! for the node. Claimed pointers are routed to their node until released
//! and never reach the background [`GestureResolver`], so a node drag can
//! never pan the canvas at the same time.
//!
//! Everything the host should react to comes back as [`CanvasIntent`]s.

use crate::drag::{DragCommit, NodeDragHandler};
use crate::gesture::GestureResolver;
use crate::input::{InputEvent, Modifiers, PointerButton, PointerCapture, PointerId};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use kurbo::{Point, Rect, Size};
use mm_core::bounds::{center_rect, fit_transform, node_rect};
use mm_core::{
    CanvasConfig, NodeAction, NodeId, NodeMetrics, NodeStore, StoreError, ViewTransform,
};
use mm_render::{FrameSnapshot, build_frame, hit_test_screen};
use serde::Serialize;
use std::collections::HashMap;

/// Something the host should know about after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CanvasIntent {
    TransformChanged {
        transform: ViewTransform,
    },
    /// A node moved visually; the store is unchanged.
    NodePreview { id: NodeId, x: f64, y: f64 },
    /// A drag finished and was committed to the store.
    NodeDragged { id: NodeId, x: f64, y: f64 },
    NodeAction {
        id: NodeId,
        action: NodeAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    ShortcutTriggered {
        action: ShortcutAction,
    },
}

#[derive(Debug, Clone)]
pub struct CanvasController {
    transform: ViewTransform,
    config: CanvasConfig,
    /// Client-space rect of the canvas element.
    surface: Rect,
    resolver: GestureResolver,
    drags: HashMap<NodeId, NodeDragHandler>,
    claims: HashMap<PointerId, NodeId>,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasController {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            config,
            surface: Rect::ZERO,
            resolver: GestureResolver::new(),
            drags: HashMap::new(),
            claims: HashMap::new(),
        }
    }

    // ─── State access ────────────────────────────────────────────────────

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Replace the transform; the scale is clamped into the configured range.
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = ViewTransform {
            scale: self.config.scale_range.clamp(transform.scale),
            ..transform
        };
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CanvasConfig) {
        self.config = config;
        self.set_transform(self.transform);
    }

    /// Position and size of the canvas element in client coordinates.
    pub fn set_surface(&mut self, origin: Point, size: Size) {
        self.surface = Rect::from_origin_size(origin, size);
    }

    pub fn surface_size(&self) -> Size {
        self.surface.size()
    }

    /// Preview positions of every node currently being dragged.
    pub fn drag_previews(&self) -> HashMap<NodeId, Point> {
        self.drags
            .iter()
            .filter_map(|(id, h)| h.preview().map(|p| (*id, p)))
            .collect()
    }

    pub fn is_dragging(&self, id: NodeId) -> bool {
        self.drags.get(&id).is_some_and(NodeDragHandler::is_dragging)
    }

    /// Snapshot for painting and hit testing, with drag previews applied.
    pub fn frame(&self, store: &NodeStore, metrics: &dyn NodeMetrics) -> FrameSnapshot {
        build_frame(
            store,
            metrics,
            self.transform,
            &self.drag_previews(),
            &self.config,
        )
    }

    // ─── Event routing ───────────────────────────────────────────────────

    pub fn handle(
        &mut self,
        event: &InputEvent,
        store: &mut NodeStore,
        metrics: &dyn NodeMetrics,
        capture: &mut dyn PointerCapture,
    ) -> Vec<CanvasIntent> {
        match *event {
            InputEvent::PointerDown {
                pointer,
                x,
                y,
                button,
            } => {
                self.pointer_down(pointer, self.to_surface(x, y), button, store, metrics, capture);
                Vec::new()
            }
            InputEvent::PointerMove { pointer, x, y } => {
                self.pointer_move(pointer, self.to_surface(x, y))
            }
            InputEvent::PointerUp { pointer, x, y } => {
                let pos = self.to_surface(x, y);
                let view = self.transform;
                self.pointer_release(pointer, store, capture, |h, cap| {
                    h.pointer_up(pointer, pos, &view, cap)
                })
            }
            InputEvent::PointerCancel { pointer } => {
                self.pointer_release(pointer, store, capture, |h, cap| {
                    h.pointer_cancel(pointer, cap)
                })
            }
            InputEvent::Wheel { x, y, delta_y } => {
                let next = self.resolver.wheel(
                    self.to_surface(x, y),
                    delta_y,
                    self.transform,
                    &self.config,
                );
                self.commit_transform(next).into_iter().collect()
            }
            InputEvent::Key { ref key, modifiers } => {
                self.key(key, modifiers, store, metrics, capture)
            }
        }
    }

    fn to_surface(&self, x: f64, y: f64) -> Point {
        Point::new(x - self.surface.x0, y - self.surface.y0)
    }

    fn pointer_down(
        &mut self,
        pointer: PointerId,
        pos: Point,
        button: PointerButton,
        store: &NodeStore,
        metrics: &dyn NodeMetrics,
        capture: &mut dyn PointerCapture,
    ) {
        let frame = self.frame(store, metrics);
        if let Some(id) = hit_test_screen(&frame, pos)
            && let Some(node) = frame.node(id)
        {
            let handler = self
                .drags
                .entry(id)
                .or_insert_with(|| NodeDragHandler::new(id));
            if handler.pointer_down(pointer, button, pos, node.rect.origin(), capture) {
                self.claims.insert(pointer, id);
                log::trace!("{pointer} claimed by {id}");
                return;
            }
            self.drags.retain(|_, h| h.is_dragging());
        }

        self.resolver.pointer_down(pointer, pos);
        if let Err(err) = capture.capture(pointer) {
            log::warn!("background capture failed: {err}");
        }
    }

    fn pointer_move(&mut self, pointer: PointerId, pos: Point) -> Vec<CanvasIntent> {
        if let Some(&id) = self.claims.get(&pointer) {
            let view = self.transform;
            return self
                .drags
                .get_mut(&id)
                .and_then(|h| h.pointer_move(pointer, pos, &view))
                .map(|p| CanvasIntent::NodePreview { id, x: p.x, y: p.y })
                .into_iter()
                .collect();
        }
        let next = self
            .resolver
            .pointer_move(pointer, pos, self.transform, &self.config);
        next.and_then(|t| self.commit_transform(t))
            .into_iter()
            .collect()
    }

    fn pointer_release(
        &mut self,
        pointer: PointerId,
        store: &mut NodeStore,
        capture: &mut dyn PointerCapture,
        finish: impl FnOnce(&mut NodeDragHandler, &mut dyn PointerCapture) -> Option<DragCommit>,
    ) -> Vec<CanvasIntent> {
        if let Some(id) = self.claims.remove(&pointer) {
            let commit = self.drags.get_mut(&id).and_then(|h| finish(h, capture));
            self.drags.retain(|_, h| h.is_dragging());
            return commit
                .and_then(|c| Self::commit_drag(store, c))
                .into_iter()
                .collect();
        }
        if self.resolver.pointer_up(pointer)
            && let Err(err) = capture.release(pointer)
        {
            log::debug!("background release ignored: {err}");
        }
        Vec::new()
    }

    fn commit_drag(store: &mut NodeStore, commit: DragCommit) -> Option<CanvasIntent> {
        match store.update_node_position(commit.id, commit.x, commit.y) {
            Ok(()) => Some(CanvasIntent::NodeDragged {
                id: commit.id,
                x: commit.x,
                y: commit.y,
            }),
            Err(err) => {
                log::warn!("dropping drag commit: {err}");
                None
            }
        }
    }

    fn key(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        store: &mut NodeStore,
        metrics: &dyn NodeMetrics,
        capture: &mut dyn PointerCapture,
    ) -> Vec<CanvasIntent> {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Vec::new();
        };
        log::debug!("shortcut {key:?} → {action:?}");

        let mut intents = vec![CanvasIntent::ShortcutTriggered { action }];
        let before = self.transform;
        match action {
            ShortcutAction::ZoomIn => {
                self.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
            }
            ShortcutAction::ZoomToFit => {
                self.fit_to_content(store, metrics);
            }
            ShortcutAction::ResetView => {
                self.reset_view();
            }
            ShortcutAction::CancelGestures => {
                intents.extend(self.cancel_gestures(store, capture));
            }
        }
        if self.transform != before {
            intents.push(CanvasIntent::TransformChanged {
                transform: self.transform,
            });
        }
        intents
    }

    fn commit_transform(&mut self, next: ViewTransform) -> Option<CanvasIntent> {
        if next == self.transform {
            return None;
        }
        log::trace!("transform → {next:?}");
        self.transform = next;
        Some(CanvasIntent::TransformChanged { transform: next })
    }

    // ─── View commands ───────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> ViewTransform {
        self.transform = self.transform.zoom_in(&self.config);
        self.transform
    }

    pub fn zoom_out(&mut self) -> ViewTransform {
        self.transform = self.transform.zoom_out(&self.config);
        self.transform
    }

    /// Fit every node into the surface.
    pub fn fit_to_content(&mut self, store: &NodeStore, metrics: &dyn NodeMetrics) -> ViewTransform {
        self.transform = fit_transform(
            store.as_slice(),
            metrics,
            self.surface.size(),
            &self.config,
        );
        self.transform
    }

    pub fn reset_view(&mut self) -> ViewTransform {
        self.transform = ViewTransform::IDENTITY;
        self.transform
    }

    /// Centre the view on one node at the current scale.
    pub fn center_on_node(
        &mut self,
        id: NodeId,
        store: &NodeStore,
        metrics: &dyn NodeMetrics,
    ) -> Result<ViewTransform, StoreError> {
        let node = store.get(id).ok_or(StoreError::UnknownNode(id))?;
        let rect = node_rect(node, metrics, &self.config);
        self.transform = center_rect(rect, self.transform.scale, self.surface.size());
        Ok(self.transform)
    }

    // ─── Gesture lifecycle ───────────────────────────────────────────────

    /// Commit every active drag at its last preview and drop all background
    /// pointers.
    pub fn cancel_gestures(
        &mut self,
        store: &mut NodeStore,
        capture: &mut dyn PointerCapture,
    ) -> Vec<CanvasIntent> {
        let mut intents = Vec::new();
        for handler in self.drags.values_mut() {
            if let Some(commit) = handler.cancel(capture)
                && let Some(intent) = Self::commit_drag(store, commit)
            {
                intents.push(intent);
            }
        }
        self.drags.clear();
        self.claims.clear();
        for pointer in self.resolver.clear() {
            if let Err(err) = capture.release(pointer) {
                log::debug!("background release ignored: {err}");
            }
        }
        intents
    }

    /// Drop drag state for a node that was removed from the store.
    pub fn forget_node(&mut self, id: NodeId, capture: &mut dyn PointerCapture) {
        if let Some(mut handler) = self.drags.remove(&id) {
            // The node is gone, so the commit has nowhere to go.
            let _ = handler.cancel(capture);
            self.claims.retain(|_, node| *node != id);
            log::debug!("forgot drag state for removed node {id}");
        }
    }

    // ─── Host intents ────────────────────────────────────────────────────

    /// Validate and forward a node action button press.
    pub fn request_node_action(
        &self,
        store: &NodeStore,
        id: NodeId,
        action: NodeAction,
        prompt: Option<String>,
    ) -> Result<CanvasIntent, StoreError> {
        if !store.contains(id) {
            return Err(StoreError::UnknownNode(id));
        }
        log::debug!("action {action:?} on {id}");
        Ok(CanvasIntent::NodeAction { id, action, prompt })
    }
}
