//! WASM bridge for the mind-map canvas.
//!
//! Compiled via `wasm-pack build --target web`. The JavaScript host owns the
//! DOM (node cards, buttons, the request orchestration) and forwards raw
//! pointer, wheel and key events here; every handler answers with a JSON
//! array of intents for the host to act on.

mod render2d;

use kurbo::{Point, Size};
use mm_core::layout::{place_child, row_slots};
use mm_core::{CanvasConfig, Node, NodeAction, NodeId, NodeStore, SizeRegistry, StoreMutation};
use mm_editor::input::{CaptureError, Modifiers, PointerButton};
use mm_editor::{CanvasController, CanvasIntent, InputEvent, PointerCapture, PointerId};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// Pointer capture through a DOM element.
///
/// Without an attached element capture is a no-op, which is also what the
/// native tests use.
#[derive(Default)]
struct DomCapture {
    element: Option<web_sys::Element>,
}

impl PointerCapture for DomCapture {
    fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
        match &self.element {
            Some(el) => el
                .set_pointer_capture(pointer.0)
                .map_err(|e| CaptureError::Platform(format!("{e:?}"))),
            None => Ok(()),
        }
    }

    fn release(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
        match &self.element {
            Some(el) => el
                .release_pointer_capture(pointer.0)
                .map_err(|_| CaptureError::InactivePointer(pointer)),
            None => Ok(()),
        }
    }
}

/// The main WASM-facing canvas.
///
/// Holds the node store, the measured sizes and the canvas controller. All
/// interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct MindCanvas {
    store: NodeStore,
    sizes: SizeRegistry,
    controller: CanvasController,
    capture: DomCapture,
    width: f64,
    height: f64,
    dark_mode: bool,
}

#[wasm_bindgen]
impl MindCanvas {
    /// Create a canvas for a surface of the given size at the page origin.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let mut controller = CanvasController::default();
        controller.set_surface(Point::ORIGIN, Size::new(width, height));
        Self {
            store: NodeStore::new(),
            sizes: SizeRegistry::new(),
            controller,
            capture: DomCapture::default(),
            width,
            height,
            dark_mode: false,
        }
    }

    // ─── Node store ──────────────────────────────────────────────────────

    /// Replace every node. Returns `{"ok":true}` or `{"ok":false,"error":…}`.
    pub fn set_nodes_json(&mut self, json: &str) -> String {
        let nodes: Vec<Node> = match serde_json::from_str(json) {
            Ok(nodes) => nodes,
            Err(e) => return error_json(e),
        };
        let mut store = match NodeStore::from_nodes(nodes) {
            Ok(store) => store,
            Err(e) => return error_json(e),
        };
        store.set_loading(self.store.is_loading());

        let gone: Vec<NodeId> = self
            .store
            .iter()
            .map(|n| n.id)
            .filter(|id| !store.contains(*id))
            .collect();
        for id in gone {
            self.controller.forget_node(id, &mut self.capture);
        }
        self.sizes.retain_ids(|id| store.contains(id));
        self.store = store;
        ok_json()
    }

    pub fn get_nodes_json(&self) -> String {
        serde_json::to_string(self.store.as_slice()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn add_node_json(&mut self, json: &str) -> String {
        let node: Node = match serde_json::from_str(json) {
            Ok(node) => node,
            Err(e) => return error_json(e),
        };
        match self.store.add_node(node) {
            Ok(()) => ok_json(),
            Err(e) => error_json(e),
        }
    }

    /// Apply a `{"op": …}` store mutation.
    pub fn apply_mutation_json(&mut self, json: &str) -> String {
        let mutation: StoreMutation = match serde_json::from_str(json) {
            Ok(m) => m,
            Err(e) => return error_json(e),
        };
        if let StoreMutation::RemoveNode { id } = mutation {
            return if self.remove_node(id.as_str()) {
                ok_json()
            } else {
                error_json(mm_core::StoreError::UnknownNode(id))
            };
        }
        match self.store.apply(mutation) {
            Ok(()) => ok_json(),
            Err(e) => error_json(e),
        }
    }

    /// Remove a node and everything the canvas tracked about it.
    /// Returns `false` if no such node exists.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(id) = NodeId::lookup(id) else {
            return false;
        };
        if self.store.remove_node(id).is_none() {
            return false;
        }
        self.sizes.forget(id);
        self.controller.forget_node(id, &mut self.capture);
        true
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.store.set_loading(loading);
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// A fresh node id such as `node_12`.
    pub fn next_node_id(&self, prefix: &str) -> String {
        NodeId::fresh(prefix).to_string()
    }

    /// Position for the next child of `parent_id`:
    /// `{"ok":true,"x":…,"y":…}` or an error for an unknown parent.
    pub fn place_child_json(&self, parent_id: &str) -> String {
        let Some(parent) = NodeId::lookup(parent_id).and_then(|id| self.store.get(id)) else {
            return error_json(format!("no node with id {parent_id}"));
        };
        let pos = place_child(parent, &self.store, self.controller.config());
        serde_json::json!({ "ok": true, "x": pos.x, "y": pos.y }).to_string()
    }

    /// Non-overlapping positions for `count` children of `parent_id` placed
    /// together, left to right: `{"ok":true,"slots":[{"x":…,"y":…},…]}`.
    pub fn row_slots_json(&self, parent_id: &str, count: u32) -> String {
        let Some(parent) = NodeId::lookup(parent_id).and_then(|id| self.store.get(id)) else {
            return error_json(format!("no node with id {parent_id}"));
        };
        let slots: Vec<_> = row_slots(parent, count as usize, self.controller.config())
            .into_iter()
            .map(|p| serde_json::json!({ "x": p.x, "y": p.y }))
            .collect();
        serde_json::json!({ "ok": true, "slots": slots }).to_string()
    }

    // ─── Configuration & measurement ─────────────────────────────────────

    /// Merge a partial `CanvasConfig` JSON object over the defaults.
    pub fn set_config_json(&mut self, json: &str) -> String {
        match CanvasConfig::from_json(json) {
            Ok(config) => {
                self.controller.set_config(config);
                ok_json()
            }
            Err(e) => error_json(e),
        }
    }

    /// Report a node's rendered size in content units.
    pub fn record_node_size(&mut self, id: &str, width: f64, height: f64) {
        match NodeId::lookup(id) {
            Some(id) if self.store.contains(id) => self.sizes.record(id, Size::new(width, height)),
            _ => log::warn!("size reported for unknown node {id:?}"),
        }
    }

    /// Canvas element position (client coordinates) and size.
    pub fn set_surface(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.controller
            .set_surface(Point::new(left, top), Size::new(width, height));
    }

    /// Route pointer capture through this element (usually the canvas root).
    pub fn attach_capture_element(&mut self, element: web_sys::Element) {
        self.capture.element = Some(element);
    }

    pub fn detach_capture_element(&mut self) {
        self.capture.element = None;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// `button` is `PointerEvent.button`. Returns a JSON intent array.
    pub fn handle_pointer_down(&mut self, pointer_id: i32, x: f64, y: f64, button: i16) -> String {
        self.dispatch(InputEvent::PointerDown {
            pointer: PointerId(pointer_id),
            x,
            y,
            button: PointerButton::from_dom(button),
        })
    }

    pub fn handle_pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerMove {
            pointer: PointerId(pointer_id),
            x,
            y,
        })
    }

    pub fn handle_pointer_up(&mut self, pointer_id: i32, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerUp {
            pointer: PointerId(pointer_id),
            x,
            y,
        })
    }

    pub fn handle_pointer_cancel(&mut self, pointer_id: i32) -> String {
        self.dispatch(InputEvent::PointerCancel {
            pointer: PointerId(pointer_id),
        })
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> String {
        self.dispatch(InputEvent::Wheel { x, y, delta_y })
    }

    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        self.dispatch(InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    /// Any `InputEvent` as JSON (`{"type":"pointerDown",…}`).
    pub fn handle_event_json(&mut self, json: &str) -> String {
        match serde_json::from_str::<InputEvent>(json) {
            Ok(event) => self.dispatch(event),
            Err(e) => error_json(e),
        }
    }

    /// Forward a node action button. `action` is the tag, e.g. `"EXPAND"`.
    pub fn request_node_action(&self, id: &str, action: &str, prompt: Option<String>) -> String {
        let action: NodeAction = match serde_json::from_value(serde_json::Value::from(action)) {
            Ok(a) => a,
            Err(e) => return error_json(e),
        };
        let Some(id) = NodeId::lookup(id) else {
            return error_json(format!("no node with id {id}"));
        };
        match self
            .controller
            .request_node_action(&self.store, id, action, prompt)
        {
            Ok(intent) => to_json(&intent),
            Err(e) => error_json(e),
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> String {
        to_json(&self.controller.zoom_in())
    }

    pub fn zoom_out(&mut self) -> String {
        to_json(&self.controller.zoom_out())
    }

    pub fn reset_view(&mut self) -> String {
        to_json(&self.controller.reset_view())
    }

    pub fn fit_to_screen(&mut self) -> String {
        to_json(&self.controller.fit_to_content(&self.store, &self.sizes))
    }

    pub fn center_on_node(&mut self, id: &str) -> String {
        let Some(id) = NodeId::lookup(id) else {
            return error_json(format!("no node with id {id}"));
        };
        match self.controller.center_on_node(id, &self.store, &self.sizes) {
            Ok(t) => to_json(&t),
            Err(e) => error_json(e),
        }
    }

    /// `{"translateX":…,"translateY":…,"scale":…}`
    pub fn get_transform_json(&self) -> String {
        to_json(&self.controller.transform())
    }

    /// CSS `transform` for the node layer.
    pub fn get_transform_css(&self) -> String {
        self.controller.transform().to_css()
    }

    pub fn get_zoom_percent(&self) -> u32 {
        self.controller.transform().zoom_percent()
    }

    /// The full frame snapshot (node boxes, connectors, transform).
    pub fn frame_json(&self) -> String {
        to_json(&self.controller.frame(&self.store, &self.sizes))
    }

    /// `[{"child":id,"d":"M … C …"}]` for hosts that draw edges as SVG.
    pub fn connector_paths_json(&self) -> String {
        let frame = self.controller.frame(&self.store, &self.sizes);
        let paths: Vec<serde_json::Value> = mm_render::svg::connector_paths(&frame.connectors)
            .into_iter()
            .map(|(child, d)| serde_json::json!({ "child": child, "d": d }))
            .collect();
        to_json(&paths)
    }

    /// Draw connectors onto a Canvas2D context covering the surface.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        let frame = self.controller.frame(&self.store, &self.sizes);
        render2d::render_connectors(ctx, &frame, self.width, self.height, &theme);
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }
}

// ─── Internal helpers (not exposed to JS) ────────────────────────────────

impl MindCanvas {
    fn dispatch(&mut self, event: InputEvent) -> String {
        let intents: Vec<CanvasIntent> =
            self.controller
                .handle(&event, &mut self.store, &self.sizes, &mut self.capture);
        serde_json::to_string(&intents).unwrap_or_else(|_| "[]".to_string())
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => error_json(format!("Serialization error: {e}")),
    }
}

fn ok_json() -> String {
    r#"{"ok":true}"#.to_string()
}

fn error_json(err: impl std::fmt::Display) -> String {
    serde_json::json!({ "ok": false, "error": err.to_string() }).to_string()
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("mind-map WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NODES: &str = r#"[
        {"id":"w_root","type":"PROMPT","content":"hi","x":0,"y":0},
        {"id":"w_kid","type":"AI_RESPONSE","content":"hello","x":0,"y":300,"parentId":"w_root"}
    ]"#;

    fn canvas() -> MindCanvas {
        let mut c = MindCanvas::new(1000.0, 800.0);
        assert_eq!(c.set_nodes_json(NODES), r#"{"ok":true}"#);
        c
    }

    #[test]
    fn bad_json_reports_an_error() {
        let mut c = canvas();
        let out: serde_json::Value = serde_json::from_str(&c.set_nodes_json("[{")).unwrap();
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().is_some());

        let dup: serde_json::Value = serde_json::from_str(&c.add_node_json(
            r#"{"id":"w_root","type":"PROMPT","content":"","x":0,"y":0}"#,
        ))
        .unwrap();
        assert_eq!(
            dup,
            serde_json::json!({ "ok": false, "error": "node w_root already exists" })
        );
    }

    #[test]
    fn drag_round_trip_commits_to_store() {
        let mut c = canvas();
        assert_eq!(c.handle_pointer_down(1, 10.0, 310.0, 0), "[]");
        c.handle_pointer_move(1, 40.0, 320.0);
        let out: serde_json::Value =
            serde_json::from_str(&c.handle_pointer_up(1, 60.0, 330.0)).unwrap();
        assert_eq!(out[0]["type"], "nodeDragged");
        assert_eq!(out[0]["x"], 50.0);
        assert_eq!(out[0]["y"], 320.0);

        let nodes: serde_json::Value = serde_json::from_str(&c.get_nodes_json()).unwrap();
        assert_eq!(nodes[1]["x"], 50.0);
    }

    #[test]
    fn place_child_and_unknown_parent() {
        let c = canvas();
        let out: serde_json::Value =
            serde_json::from_str(&c.place_child_json("w_root")).unwrap();
        // One child exists, so the next one takes the right slot of a pair.
        assert_eq!(out["x"], 212.0);
        assert_eq!(out["y"], 300.0);

        let missing: serde_json::Value =
            serde_json::from_str(&c.place_child_json("w_nobody")).unwrap();
        assert_eq!(missing["ok"], false);
    }

    #[test]
    fn row_slots_lay_out_a_batch_side_by_side() {
        let c = canvas();
        let out: serde_json::Value =
            serde_json::from_str(&c.row_slots_json("w_root", 3)).unwrap();
        assert_eq!(out["ok"], true);
        let xs: Vec<f64> = out["slots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["x"].as_f64().unwrap())
            .collect();
        // Three wide: 3*384 + 2*40 = 1232, centred on x = 192.
        assert_eq!(xs, vec![-424.0, 0.0, 424.0]);
        assert_eq!(out["slots"][0]["y"], 300.0);

        let missing: serde_json::Value =
            serde_json::from_str(&c.row_slots_json("w_nobody", 2)).unwrap();
        assert_eq!(missing["ok"], false);
    }

    #[test]
    fn removing_a_node_drops_its_connector() {
        let mut c = canvas();
        let before: serde_json::Value = serde_json::from_str(&c.frame_json()).unwrap();
        assert_eq!(before["connectors"].as_array().map(Vec::len), Some(1));

        assert!(c.remove_node("w_root"));
        assert!(!c.remove_node("w_root"));
        let after: serde_json::Value = serde_json::from_str(&c.frame_json()).unwrap();
        assert_eq!(after["connectors"].as_array().map(Vec::len), Some(0));
        assert_eq!(after["nodes"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn config_and_zoom_buttons() {
        let mut c = canvas();
        let bad: serde_json::Value =
            serde_json::from_str(&c.set_config_json(r#"{"nodeWidth":0}"#)).unwrap();
        assert_eq!(bad["ok"], false);

        assert_eq!(c.set_config_json(r#"{"zoomInFactor":2.0}"#), r#"{"ok":true}"#);
        let t: serde_json::Value = serde_json::from_str(&c.zoom_in()).unwrap();
        assert_eq!(t["scale"], 2.0);
        assert_eq!(c.get_zoom_percent(), 200);
    }

    #[test]
    fn node_actions_are_validated() {
        let c = canvas();
        let ok: serde_json::Value =
            serde_json::from_str(&c.request_node_action("w_kid", "SUMMARIZE", None)).unwrap();
        assert_eq!(ok["type"], "nodeAction");
        assert_eq!(ok["action"], "SUMMARIZE");

        let bad: serde_json::Value =
            serde_json::from_str(&c.request_node_action("w_kid", "DANCE", None)).unwrap();
        assert_eq!(bad["ok"], false);
    }
}
