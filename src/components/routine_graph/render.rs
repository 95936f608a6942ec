use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::types::{Point, TimeSlot};
use super::visual::{EdgeVisual, Emphasis, Frame, NodeVisual, OpacityTier, SegmentVisual};

const BACKGROUND: &str = "#ffffff";
const LABEL: &str = "#374151";

/// Paints one frame. `rotation_deg` turns the whole layout about `pivot`
/// (the day-focus animation); it never feeds back into positions.
pub fn render(
	frame: &Frame,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	rotation_deg: f64,
	pivot: Point,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	if rotation_deg != 0.0 {
		let _ = ctx.translate(pivot.x, pivot.y);
		let _ = ctx.rotate(rotation_deg.to_radians());
		let _ = ctx.translate(-pivot.x, -pivot.y);
	}
	for segment in &frame.segments {
		draw_segment(segment, ctx);
	}
	for edge in &frame.edges {
		draw_edge(edge, ctx);
	}
	for node in &frame.nodes {
		draw_node(node, ctx);
	}
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<[f64; 2]>) {
	let pattern = match dash {
		Some([on, off]) => js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_segment(segment: &SegmentVisual, ctx: &CanvasRenderingContext2d) {
	let c = segment.center;
	ctx.begin_path();
	ctx.move_to(c.x, c.y);
	let _ = ctx.arc(c.x, c.y, segment.outer_radius, segment.start_angle, segment.end_angle);
	ctx.close_path();
	ctx.set_fill_style_str(if segment.selected { "#f3f4f6" } else { "#fafafa" });
	ctx.fill();
	ctx.set_stroke_style_str("#e5e7eb");
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_fill_style_str(LABEL);
	ctx.set_font("500 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(segment.day.label(), segment.label_at.x, segment.label_at.y);
}

fn draw_edge(edge: &EdgeVisual, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(edge.color);
	set_dash(ctx, edge.dash);

	// Halo under highlighted and hovered edges.
	if edge.tier == OpacityTier::Highlighted || edge.hovered {
		ctx.set_global_alpha(0.3);
		ctx.set_line_width(edge.width + 2.0);
		stroke_line(ctx, edge.from, edge.to);
	}

	ctx.set_global_alpha(edge.opacity);
	ctx.set_line_width(edge.width);
	stroke_line(ctx, edge.from, edge.to);
	ctx.set_global_alpha(1.0);
	set_dash(ctx, None);
}

fn stroke_line(ctx: &CanvasRenderingContext2d, from: Point, to: Point) {
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
}

fn circle(ctx: &CanvasRenderingContext2d, at: Point, radius: f64) {
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, radius.max(0.0), 0.0, 2.0 * PI);
}

fn draw_node(node: &NodeVisual, ctx: &CanvasRenderingContext2d) {
	let (p, r) = (node.position, node.radius);

	if node.emphasis == Emphasis::Hover {
		if let Ok(glow) = ctx.create_radial_gradient(p.x, p.y, r * 0.6, p.x, p.y, r * 1.8) {
			let _ = glow.add_color_stop(0.0, "rgba(31, 41, 55, 0.18)");
			let _ = glow.add_color_stop(1.0, "rgba(31, 41, 55, 0)");
			circle(ctx, p, r * 1.8);
			#[allow(deprecated)]
			ctx.set_fill_style(&glow);
			ctx.fill();
		}
	}

	if node.emphasis == Emphasis::Selected {
		circle(ctx, p, r + 4.0);
		ctx.set_global_alpha(0.5);
		ctx.set_stroke_style_str(node.fill);
		ctx.set_line_width(2.0);
		ctx.stroke();
		ctx.set_global_alpha(1.0);
	}

	circle(ctx, p, r);
	ctx.set_fill_style_str(node.fill);
	ctx.fill();
	let (stroke, width) = if node.highlighted {
		("#1f2937", 3.0)
	} else {
		("#9ca3af", 1.0)
	};
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(width);
	ctx.stroke();

	if node.highlighted && r > 5.0 {
		circle(ctx, p, r - 5.0);
		ctx.set_global_alpha(0.8);
		ctx.set_stroke_style_str("white");
		ctx.set_line_width(2.0);
		ctx.stroke();
		ctx.set_global_alpha(1.0);
	}

	if node.focused {
		circle(ctx, p, r + 7.0);
		set_dash(ctx, Some([3.0, 3.0]));
		ctx.set_stroke_style_str("#2563eb");
		ctx.set_line_width(1.5);
		ctx.stroke();
		set_dash(ctx, None);
	}

	ctx.set_fill_style_str(LABEL);
	ctx.set_font("500 12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	let mut label_y = p.y + r + 15.0;
	if let Some(slot) = node.time_slot {
		let marker = match slot {
			TimeSlot::Morning => "AM",
			TimeSlot::Evening => "PM",
		};
		let _ = ctx.fill_text(marker, p.x, label_y);
		label_y += 12.0;
	}
	let _ = ctx.fill_text(&node.label, p.x, label_y);
}
