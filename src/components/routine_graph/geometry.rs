//! Closed-form placement and visual parameters. Everything here is pure.

use std::f64::consts::PI;

use rand::Rng;

use super::types::{EdgeKind, GraphNode, Point, Severity};

const PALETTE: &[(u32, &str)] = &[
	(1, "#FFADAD"),
	(2, "#A0C4FF"),
	(3, "#BDB2FF"),
	(4, "#FFD6A5"),
	(5, "#CAFFBF"),
	(6, "#9BF6FF"),
];

pub const FALLBACK_FILL: &str = "#e5e7eb";
pub const NEUTRAL_EDGE: &str = "#6b7280";

/// Places node `i` of `n` at angle `2πi/n` on the circle. Input order is the
/// angular order, so the caller decides grouping.
pub fn circular_layout(nodes: &mut [GraphNode], center: Point, radius: f64) {
	let n = nodes.len() as f64;
	for (i, node) in nodes.iter_mut().enumerate() {
		let angle = 2.0 * PI * i as f64 / n;
		node.position = Some(Point::new(
			center.x + radius * angle.cos(),
			center.y + radius * angle.sin(),
		));
	}
}

/// Offsets every positioned node by an independent uniform amount in
/// `[-amount/2, amount/2]` on each axis. Unpositioned nodes are left alone.
pub fn apply_jitter<R: Rng + ?Sized>(nodes: &mut [GraphNode], amount: f64, rng: &mut R) {
	if amount <= 0.0 {
		return;
	}
	let half = amount / 2.0;
	for position in nodes.iter_mut().filter_map(|n| n.position.as_mut()) {
		position.x += rng.gen_range(-half..=half);
		position.y += rng.gen_range(-half..=half);
	}
}

pub fn node_radius(degree: u32, base: f64, per_degree: f64) -> f64 {
	base + per_degree * degree as f64
}

pub fn node_fill(color_group: u32) -> &'static str {
	PALETTE
		.iter()
		.find(|(group, _)| *group == color_group)
		.map(|(_, color)| *color)
		.unwrap_or(FALLBACK_FILL)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: &'static str,
	pub width: f64,
	pub highlight_width: f64,
	/// `[dash, gap]`, `None` for a solid stroke.
	pub dash: Option<[f64; 2]>,
	/// Opacity of an edge that is not highlighted.
	pub base_opacity: f64,
}

impl EdgeStyle {
	pub const NEUTRAL: EdgeStyle = EdgeStyle {
		color: NEUTRAL_EDGE,
		width: 1.0,
		highlight_width: 1.0,
		dash: None,
		base_opacity: 0.3,
	};

	const fn solid(color: &'static str, width: f64, highlight_width: f64, base_opacity: f64) -> Self {
		Self {
			color,
			width,
			highlight_width,
			dash: None,
			base_opacity,
		}
	}
}

/// Fixed style lookup. Unknown kinds and severities fall back to
/// [`EdgeStyle::NEUTRAL`].
pub fn edge_visual_style(kind: &EdgeKind) -> EdgeStyle {
	match kind {
		EdgeKind::Conflict {
			severity: Some(severity),
			..
		} => match severity {
			Severity::High => EdgeStyle::solid("#ef4444", 3.0, 3.0, 0.3),
			Severity::Medium => EdgeStyle::solid("#f59e0b", 2.0, 2.0, 0.3),
			Severity::Low => EdgeStyle::solid("#eab308", 1.5, 1.5, 0.3),
			Severity::Unknown => EdgeStyle::NEUTRAL,
		},
		EdgeKind::Conflict { severity: None, .. } => EdgeStyle::solid("#ef4444", 2.0, 3.0, 0.4),
		EdgeKind::SameDay => EdgeStyle::solid("#9ca3af", 2.0, 3.0, 0.4),
		EdgeKind::AdjacentDay => EdgeStyle {
			dash: Some([5.0, 5.0]),
			..EdgeStyle::solid("#60a5fa", 2.0, 3.0, 0.4)
		},
		EdgeKind::Unknown => EdgeStyle::NEUTRAL,
	}
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
	use approx::assert_abs_diff_eq;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn nodes(n: usize) -> Vec<GraphNode> {
		(0..n)
			.map(|i| GraphNode::new(format!("n{i}"), format!("Node {i}"), 1))
			.collect()
	}

	#[test]
	fn circular_layout_uses_even_angles_on_the_radius() {
		let center = Point::new(400.0, 300.0);
		for n in 1..=12 {
			let mut nodes = nodes(n);
			circular_layout(&mut nodes, center, 150.0);
			for (i, node) in nodes.iter().enumerate() {
				let p = node.position.unwrap();
				assert_abs_diff_eq!(p.distance(center), 150.0, epsilon = 1e-9);
				let expected = 2.0 * PI * i as f64 / n as f64;
				let actual = (p.y - center.y).atan2(p.x - center.x).rem_euclid(2.0 * PI);
				let diff = (actual - expected).abs();
				assert!(diff < 1e-9 || (2.0 * PI - diff) < 1e-9, "node {i} of {n}");
			}
		}
	}

	#[test]
	fn circular_layout_is_deterministic() {
		let (mut a, mut b) = (nodes(7), nodes(7));
		circular_layout(&mut a, Point::new(0.0, 0.0), 10.0);
		circular_layout(&mut b, Point::new(0.0, 0.0), 10.0);
		assert_eq!(a, b);
	}

	#[test]
	fn jitter_stays_within_bounds_and_skips_unplaced_nodes() {
		let mut placed = nodes(20);
		circular_layout(&mut placed, Point::new(0.0, 0.0), 100.0);
		let before = placed.clone();
		let mut unplaced = nodes(1);
		placed.append(&mut unplaced);

		let mut rng = StdRng::seed_from_u64(7);
		apply_jitter(&mut placed, 4.0, &mut rng);

		for (after, before) in placed.iter().zip(&before) {
			let (a, b) = (after.position.unwrap(), before.position.unwrap());
			assert!((a.x - b.x).abs() <= 2.0);
			assert!((a.y - b.y).abs() <= 2.0);
		}
		assert_eq!(placed.last().unwrap().position, None);
	}

	#[test]
	fn node_radius_grows_with_degree() {
		assert_eq!(node_radius(0, 20.0, 3.0), 20.0);
		assert_eq!(node_radius(3, 20.0, 3.0), 29.0);
		assert!((0..50).all(|d| node_radius(d + 1, 20.0, 3.0) >= node_radius(d, 20.0, 3.0)));
	}

	#[test]
	fn unknown_styles_fall_back_to_neutral() {
		assert_eq!(edge_visual_style(&EdgeKind::Unknown), EdgeStyle::NEUTRAL);
		let odd = EdgeKind::Conflict {
			severity: Some(Severity::Unknown),
			mechanism: None,
		};
		let style = edge_visual_style(&odd);
		assert_eq!(style.color, NEUTRAL_EDGE);
		assert_eq!(style.width, 1.0);
		assert_eq!(style.dash, None);
	}

	#[test]
	fn severity_and_relation_styles() {
		assert_eq!(edge_visual_style(&EdgeKind::conflict(Severity::High, "")).width, 3.0);
		assert_eq!(edge_visual_style(&EdgeKind::conflict(Severity::Low, "")).width, 1.5);
		assert_eq!(edge_visual_style(&EdgeKind::AdjacentDay).dash, Some([5.0, 5.0]));
		assert_eq!(edge_visual_style(&EdgeKind::weekly_conflict()).color, "#ef4444");
	}

	#[test]
	fn fill_falls_back_for_unknown_groups() {
		assert_eq!(node_fill(2), "#A0C4FF");
		assert_eq!(node_fill(42), FALLBACK_FILL);
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		let (a, b) = (Point::new(0.0, 0.0), Point::new(10.0, 0.0));
		assert_abs_diff_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
		assert_abs_diff_eq!(distance_to_segment(Point::new(13.0, 4.0), a, b), 5.0);
		assert_abs_diff_eq!(distance_to_segment(Point::new(1.0, 1.0), a, a), 2f64.sqrt());
	}
}
