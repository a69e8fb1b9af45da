//! SVG path data for connectors, for hosts that draw edges in the DOM.

use kurbo::CubicBez;
use mm_core::connector::Connector;
use std::fmt::Write;

/// `M x0 y0 C x1 y1, x2 y2, x3 y3` for a single cubic segment.
pub fn connector_path_data(curve: &CubicBez) -> String {
    let mut d = String::with_capacity(64);
    let _ = write!(
        d,
        "M {} {} C {} {}, {} {}, {} {}",
        fmt_num(curve.p0.x),
        fmt_num(curve.p0.y),
        fmt_num(curve.p1.x),
        fmt_num(curve.p1.y),
        fmt_num(curve.p2.x),
        fmt_num(curve.p2.y),
        fmt_num(curve.p3.x),
        fmt_num(curve.p3.y),
    );
    d
}

/// Path data for every connector, keyed by child id.
pub fn connector_paths(connectors: &[Connector]) -> Vec<(String, String)> {
    connectors
        .iter()
        .map(|c| (c.child.to_string(), connector_path_data(&c.curve())))
        .collect()
}

/// Two decimals, trailing zeros dropped.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".into() } else { s.to_string() }
}
