use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::interaction::{
	BADGE_SIZE, CONNECTOR_RADIUS, ConnectorSide, HANDLE_RADIUS, badge_position,
	connector_position, handle_position,
};
use super::state::EditorState;
use super::types::{ConnectionKind, Node, Point};

const BACKGROUND: &str = "#111827";
const SELECTED_RING: &str = "#818cf8";
const LEFT_CONNECTOR: &str = "#22d3ee";
const RIGHT_CONNECTOR: &str = "#e879f9";

fn connection_colour(kind: ConnectionKind, alpha: f64) -> String {
	match kind {
		ConnectionKind::Harmony => format!("rgba(59, 130, 246, {alpha})"),
		ConnectionKind::Tension => format!("rgba(239, 68, 68, {alpha})"),
	}
}

/// Redraws the whole scene. `width` and `height` are the canvas size in pixels.
pub fn render(
	state: &EditorState,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	orbit_radii: &[f64],
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	let centre = Point::new(width / 2.0, height / 2.0);
	draw_orbits(ctx, centre, orbit_radii);
	if state.graph.is_empty() {
		draw_empty_hint(ctx, centre);
		return;
	}
	draw_connections(state, ctx);
	draw_pending_line(state, ctx);
	for node in state.graph.nodes() {
		draw_node(state, ctx, node);
	}
}

fn draw_orbits(ctx: &CanvasRenderingContext2d, centre: Point, radii: &[f64]) {
	ctx.set_stroke_style_str("rgba(75, 85, 99, 0.5)");
	ctx.set_line_width(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(4.0),
		&JsValue::from_f64(6.0),
	));
	for &r in radii {
		ctx.begin_path();
		let _ = ctx.arc(centre.x, centre.y, r, 0.0, 2.0 * PI);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_empty_hint(ctx: &CanvasRenderingContext2d, centre: Point) {
	ctx.set_fill_style_str("rgba(156, 163, 175, 0.8)");
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text("Drag tags from the library to place planets", centre.x, centre.y + 80.0);
}

fn draw_connections(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	let graph = &state.graph;
	for conn in graph.connections() {
		let (Some(from), Some(to)) = (graph.node(conn.from), graph.node(conn.to)) else {
			continue;
		};
		let (a, b) = (from.centre(), to.centre());
		ctx.set_stroke_style_str(&connection_colour(conn.kind, 0.8));
		ctx.set_line_width(2.0);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.bezier_curve_to(a.x + 80.0, a.y, b.x - 80.0, b.y, b.x, b.y);
		ctx.stroke();

		let Some(m) = badge_position(graph, conn.from, conn.to) else {
			continue;
		};
		let half = BADGE_SIZE / 2.0;
		ctx.set_fill_style_str(&connection_colour(conn.kind, 1.0));
		ctx.begin_path();
		let _ = ctx.arc(m.x, m.y, half, 0.0, 2.0 * PI);
		ctx.fill();
		ctx.set_fill_style_str("white");
		ctx.set_font("bold 11px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(conn.kind.badge(), m.x, m.y);
	}
}

fn draw_pending_line(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	let Some((from, to)) = state.controller.pending_line() else {
		return;
	};
	ctx.set_stroke_style_str("rgba(250, 204, 21, 0.9)");
	ctx.set_line_width(2.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(4.0),
	));
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_node(state: &EditorState, ctx: &CanvasRenderingContext2d, node: &Node) {
	let c = node.centre();
	let radius = node.size / 2.0;
	let colour = node.category.colour();
	let selected = state.controller.selection() == Some(node.id);
	let glow = state
		.weights
		.glow(&node.tag, state.settings.redistribution_enabled);

	ctx.save();
	if glow > 0.0 {
		ctx.set_shadow_color(colour);
		ctx.set_shadow_blur(glow);
	}
	ctx.begin_path();
	let _ = ctx.arc(c.x, c.y, radius, 0.0, 2.0 * PI);
	match ctx.create_radial_gradient(
		c.x - radius * 0.3,
		c.y - radius * 0.3,
		radius * 0.1,
		c.x,
		c.y,
		radius,
	) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, colour);
			let _ = gradient.add_color_stop(1.0, "#1f2937");
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(colour),
	}
	ctx.fill();
	ctx.restore();

	ctx.set_stroke_style_str(if selected { SELECTED_RING } else { "#4b5563" });
	ctx.set_line_width(if selected { 3.0 } else { 1.5 });
	ctx.stroke();

	for (side, fill) in [
		(ConnectorSide::Left, LEFT_CONNECTOR),
		(ConnectorSide::Right, RIGHT_CONNECTOR),
	] {
		let p = connector_position(node, side);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, CONNECTOR_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(fill);
		ctx.fill();
	}

	let h = handle_position(node);
	ctx.begin_path();
	let _ = ctx.arc(h.x, h.y, HANDLE_RADIUS * 0.6, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("rgba(156, 163, 175, 0.8)");
	ctx.fill();

	ctx.set_fill_style_str("white");
	ctx.set_font(&format!("bold {}px sans-serif", (node.size / 8.0).max(8.0)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&node.name, c.x, c.y);
}
