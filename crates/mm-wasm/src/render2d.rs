//! Canvas2D connector renderer.
//!
//! Node cards are DOM elements positioned by the host with the CSS transform;
//! this layer draws the connectors underneath them on a full-size
//! `<canvas>`. Curves are built in content space and drawn under the view
//! transform, with the line width divided by the scale so edges keep a
//! constant on-screen thickness.

use mm_render::FrameSnapshot;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the connector layer.
pub struct CanvasTheme {
    pub bg: Option<&'static str>,
    pub connector: &'static str,
    pub pending_connector: &'static str,
    pub unmeasured_outline: &'static str,
}

impl CanvasTheme {
    /// Light theme, transparent background so the page shows through.
    pub fn light() -> Self {
        Self {
            bg: None,
            connector: "#94A3B8",
            pending_connector: "#CBD5E1",
            unmeasured_outline: "rgba(100, 116, 139, 0.35)",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Some("#0F172A"),
            connector: "#475569",
            pending_connector: "#334155",
            unmeasured_outline: "rgba(148, 163, 184, 0.25)",
        }
    }
}

const CONNECTOR_WIDTH: f64 = 2.0;
const DASH: f64 = 6.0;

/// Draw one frame's connectors to a Canvas2D context.
pub fn render_connectors(
    ctx: &CanvasRenderingContext2d,
    frame: &FrameSnapshot,
    canvas_width: f64,
    canvas_height: f64,
    theme: &CanvasTheme,
) {
    ctx.clear_rect(0.0, 0.0, canvas_width, canvas_height);
    if let Some(bg) = theme.bg {
        ctx.set_fill_style_str(bg);
        ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);
    }

    let t = frame.transform;
    ctx.save();
    if let Err(e) = ctx.set_transform(t.scale, 0.0, 0.0, t.scale, t.translate_x, t.translate_y) {
        log::warn!("canvas transform rejected: {e:?}");
        ctx.restore();
        return;
    }
    let line_width = CONNECTOR_WIDTH / t.scale;
    ctx.set_line_width(line_width);
    ctx.set_line_cap("round");

    for connector in &frame.connectors {
        let pending = frame.is_pending_connector(connector);
        if pending {
            set_dash(ctx, DASH / t.scale);
            ctx.set_stroke_style_str(theme.pending_connector);
        } else {
            set_dash(ctx, 0.0);
            ctx.set_stroke_style_str(theme.connector);
        }

        let c = connector.curve();
        ctx.begin_path();
        ctx.move_to(c.p0.x, c.p0.y);
        ctx.bezier_curve_to(c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y);
        ctx.stroke();
    }

    // Nodes not yet measured by the host get a faint placeholder box, so a
    // slow first layout does not leave connectors pointing at nothing.
    set_dash(ctx, DASH / t.scale);
    ctx.set_line_width(1.0 / t.scale);
    ctx.set_stroke_style_str(theme.unmeasured_outline);
    for node in frame.nodes.iter().filter(|n| !n.measured) {
        let r = node.rect;
        ctx.stroke_rect(r.x0, r.y0, r.width(), r.height());
    }

    ctx.restore();
}

/// Dashed when `len > 0`, solid otherwise.
fn set_dash(ctx: &CanvasRenderingContext2d, len: f64) {
    let pattern = if len > 0.0 {
        js_sys::Array::of2(&JsValue::from_f64(len), &JsValue::from_f64(len))
    } else {
        js_sys::Array::new()
    };
    let _ = ctx.set_line_dash(&pattern);
}
