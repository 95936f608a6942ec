//! The seven-day radial view.
//!
//! The circle is cut into seven equal wedges, Monday at the top, running
//! clockwise (screen y grows downwards). Inside a wedge, morning nodes lean
//! towards the start edge and evening nodes towards the end edge; nodes of
//! the same day are spread along the radius by their `sequence_in_day` rank
//! so the day's cluster straddles the nominal radius.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use super::types::{
	Conflict, DailyRoutine, Day, EdgeKind, GraphData, GraphEdge, GraphNode, NodeId, Point,
	ScheduleSlot, TimeSlot, WeeklyGraph,
};

pub const SEGMENT_ANGLE: f64 = 2.0 * PI / 7.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DaySegment {
	pub day: Day,
	/// Centre angle in radians.
	pub angle: f64,
	pub start_angle: f64,
	pub end_angle: f64,
	pub center: Point,
	pub radius: f64,
}

impl DaySegment {
	pub fn width(&self) -> f64 {
		self.end_angle - self.start_angle
	}

	/// Point at `radius` on the segment's centre line, used for day labels.
	pub fn anchor(&self, radius: f64) -> Point {
		Point::new(
			self.center.x + radius * self.angle.cos(),
			self.center.y + radius * self.angle.sin(),
		)
	}
}

pub fn segment_center_angle(day: Day) -> f64 {
	day.index() as f64 * SEGMENT_ANGLE - PI / 2.0
}

pub fn day_segments(center: Point, radius: f64) -> [DaySegment; 7] {
	Day::ALL.map(|day| {
		let angle = segment_center_angle(day);
		DaySegment {
			day,
			angle,
			start_angle: angle - SEGMENT_ANGLE / 2.0,
			end_angle: angle + SEGMENT_ANGLE / 2.0,
			center,
			radius,
		}
	})
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialParams {
	pub spacing: f64,
	/// Fraction of the segment width; morning gets `-offset`, evening `+offset`.
	pub slot_offset: f64,
}

impl Default for RadialParams {
	fn default() -> Self {
		Self {
			spacing: 15.0,
			slot_offset: 0.3,
		}
	}
}

/// A node's rank among the nodes of its day, and that day's node count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayRank {
	pub index: usize,
	pub count: usize,
}

pub fn node_position_in_segment(
	time_slot: TimeSlot,
	segment: &DaySegment,
	rank: DayRank,
	params: RadialParams,
) -> Point {
	let offset = match time_slot {
		TimeSlot::Morning => -params.slot_offset,
		TimeSlot::Evening => params.slot_offset,
	};
	let angle = segment.angle + offset * segment.width();
	let spread = (rank.index as f64 - (rank.count as f64 - 1.0) / 2.0) * params.spacing;
	let r = segment.radius + spread;
	Point::new(
		segment.center.x + r * angle.cos(),
		segment.center.y + r * angle.sin(),
	)
}

/// Node indices per day, each list ordered by `sequence_in_day` (stable, so
/// authored order breaks ties). Nodes without a slot are skipped.
pub fn nodes_by_day(nodes: &[GraphNode]) -> [Vec<usize>; 7] {
	let mut days: [Vec<usize>; 7] = Default::default();
	for (i, node) in nodes.iter().enumerate() {
		if let Some(slot) = node.slot {
			days[slot.day.index()].push(i);
		}
	}
	for day in &mut days {
		day.sort_by_key(|&i| nodes[i].slot.map(|s| s.sequence_in_day));
	}
	days
}

/// Places every weekly node in its day's wedge. Nodes without a slot go to
/// the centre.
pub fn radial_layout(nodes: &mut [GraphNode], center: Point, radius: f64, params: RadialParams) {
	let segments = day_segments(center, radius);
	let by_day = nodes_by_day(nodes);
	for node in nodes.iter_mut() {
		if node.slot.is_none() {
			node.position = Some(center);
		}
	}
	for (segment, members) in segments.iter().zip(&by_day) {
		let count = members.len();
		for (index, &i) in members.iter().enumerate() {
			if let Some(slot) = nodes[i].slot {
				nodes[i].position = Some(node_position_in_segment(
					slot.time_slot,
					segment,
					DayRank { index, count },
					params,
				));
			}
		}
	}
}

/// Rotation, in degrees, applied to the whole layout when `day` is focused.
pub fn focus_rotation_degrees(day: Day) -> f64 {
	-segment_center_angle(day).to_degrees()
}

fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Timed rotation for the day-focus animation. The owner supplies the clock;
/// nothing here touches node positions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DayFocus {
	from: f64,
	to: f64,
	started_ms: f64,
	duration_ms: f64,
	revert_at_ms: Option<f64>,
}

impl DayFocus {
	/// Starts easing from the current angle towards `target_deg` and schedules
	/// a return to zero `revert_after_ms` later. Replaces any pending revert.
	pub fn start(&mut self, target_deg: f64, now_ms: f64, duration_ms: f64, revert_after_ms: f64) {
		let current = self.angle_at(now_ms);
		*self = DayFocus {
			from: current,
			to: target_deg,
			started_ms: now_ms,
			duration_ms,
			revert_at_ms: Some(now_ms + revert_after_ms),
		};
	}

	/// Drops the pending revert and snaps back to zero.
	pub fn cancel(&mut self) {
		*self = DayFocus::default();
	}

	/// Advances to `now_ms` and returns the rotation to draw with.
	pub fn advance(&mut self, now_ms: f64) -> f64 {
		if let Some(revert_at) = self.revert_at_ms.filter(|&at| now_ms >= at) {
			let current = self.angle_at(revert_at);
			*self = DayFocus {
				from: current,
				to: 0.0,
				started_ms: revert_at,
				duration_ms: self.duration_ms,
				revert_at_ms: None,
			};
		}
		self.angle_at(now_ms)
	}

	pub fn angle_at(&self, now_ms: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			return self.to;
		}
		let t = ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0);
		self.from + (self.to - self.from) * ease_in_out_cubic(t)
	}

	pub fn is_settled(&self, now_ms: f64) -> bool {
		self.revert_at_ms.is_none() && now_ms >= self.started_ms + self.duration_ms
	}
}

/// Turns a week of routines into nodes: ids from 1, days in order, morning
/// products before evening ones, `sequence_in_day` in authored order.
pub fn build_weekly_nodes(
	schedule: &BTreeMap<Day, DailyRoutine>,
	color_of: impl Fn(&str) -> Option<u32>,
) -> Vec<GraphNode> {
	let mut nodes = Vec::new();
	let mut next_id = 1u32;
	for day in Day::ALL {
		let Some(routine) = schedule.get(&day) else {
			continue;
		};
		let slots = routine
			.morning
			.iter()
			.map(|name| (TimeSlot::Morning, name))
			.chain(routine.evening.iter().map(|name| (TimeSlot::Evening, name)));
		for (sequence_in_day, (time_slot, name)) in slots.enumerate() {
			nodes.push(
				GraphNode::new(next_id, name.as_str(), color_of(name.as_str()).unwrap_or(1)).with_slot(
					ScheduleSlot {
						day,
						time_slot,
						sequence_in_day: sequence_in_day as u32,
					},
				),
			);
			next_id += 1;
		}
	}
	nodes
}

/// Same-day chains, Monday-to-Sunday hand-offs (no wrap) and one conflict
/// edge per occurrence pair of two conflicting products.
pub fn derive_weekly_edges(nodes: &[GraphNode], conflicts: &[Conflict]) -> Vec<GraphEdge> {
	let by_day = nodes_by_day(nodes);
	let mut edges = Vec::new();

	for members in &by_day {
		for pair in members.windows(2) {
			edges.push(GraphEdge::new(
				nodes[pair[0]].id.clone(),
				nodes[pair[1]].id.clone(),
				EdgeKind::SameDay,
			));
		}
	}

	for pair in by_day.windows(2) {
		if let (Some(&last), Some(&first)) = (pair[0].last(), pair[1].first()) {
			edges.push(GraphEdge::new(
				nodes[last].id.clone(),
				nodes[first].id.clone(),
				EdgeKind::AdjacentDay,
			));
		}
	}

	let mut by_name: HashMap<&str, Vec<&NodeId>> = HashMap::new();
	for node in nodes {
		by_name.entry(node.name.as_str()).or_default().push(&node.id);
	}
	for conflict in conflicts {
		let (Some(sources), Some(targets)) = (
			by_name.get(conflict.product_a.as_str()),
			by_name.get(conflict.product_b.as_str()),
		) else {
			continue;
		};
		for &source in sources {
			for &target in targets {
				if source != target {
					edges.push(GraphEdge::new(
						source.clone(),
						target.clone(),
						EdgeKind::weekly_conflict(),
					));
				}
			}
		}
	}

	edges
}

pub fn build_weekly_graph(
	schedule: &BTreeMap<Day, DailyRoutine>,
	color_of: impl Fn(&str) -> Option<u32>,
	conflicts: &[Conflict],
	chromatic_number: u32,
	computation_time: &str,
) -> WeeklyGraph {
	let nodes = build_weekly_nodes(schedule, color_of);
	let edges = derive_weekly_edges(&nodes, conflicts);
	WeeklyGraph {
		graph: GraphData { nodes, edges },
		chromatic_number,
		computation_time: computation_time.to_owned(),
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeeklyStats {
	pub total_nodes: usize,
	pub total_edges: usize,
	pub conflict_edges: usize,
	pub same_day_edges: usize,
	pub adjacent_day_edges: usize,
	pub nodes_by_day: BTreeMap<Day, usize>,
	pub morning_nodes: usize,
	pub evening_nodes: usize,
	pub color_groups: BTreeMap<u32, usize>,
	pub chromatic_number: u32,
	pub computation_time: String,
}

impl WeeklyStats {
	pub fn of(weekly: &WeeklyGraph) -> Self {
		let graph = &weekly.graph;
		let mut stats = WeeklyStats {
			total_nodes: graph.nodes.len(),
			total_edges: graph.edges.len(),
			chromatic_number: weekly.chromatic_number,
			computation_time: weekly.computation_time.clone(),
			nodes_by_day: Day::ALL.iter().map(|&d| (d, 0)).collect(),
			..Default::default()
		};
		for edge in &graph.edges {
			match edge.kind {
				EdgeKind::Conflict { .. } => stats.conflict_edges += 1,
				EdgeKind::SameDay => stats.same_day_edges += 1,
				EdgeKind::AdjacentDay => stats.adjacent_day_edges += 1,
				EdgeKind::Unknown => {}
			}
		}
		for node in &graph.nodes {
			*stats.color_groups.entry(node.color_group).or_default() += 1;
			let Some(slot) = node.slot else { continue };
			*stats.nodes_by_day.entry(slot.day).or_default() += 1;
			match slot.time_slot {
				TimeSlot::Morning => stats.morning_nodes += 1,
				TimeSlot::Evening => stats.evening_nodes += 1,
			}
		}
		stats
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_abs_diff_eq;

	use super::*;
	use crate::components::routine_graph::types::Severity;

	fn routine(morning: &[&str], evening: &[&str]) -> DailyRoutine {
		DailyRoutine {
			morning: morning.iter().map(|s| s.to_string()).collect(),
			evening: evening.iter().map(|s| s.to_string()).collect(),
		}
	}

	fn conflict(a: &str, b: &str) -> Conflict {
		Conflict {
			product_a: a.into(),
			product_b: b.into(),
			severity: Severity::High,
			mechanism: String::new(),
		}
	}

	fn count(edges: &[GraphEdge], kind: &EdgeKind) -> usize {
		edges.iter().filter(|e| &e.kind == kind).count()
	}

	#[test]
	fn segments_partition_the_circle() {
		for (center, radius) in [
			(Point::new(0.0, 0.0), 1.0),
			(Point::new(-50.0, 320.5), 210.0),
		] {
			let segments = day_segments(center, radius);
			let total: f64 = segments.iter().map(DaySegment::width).sum();
			assert_abs_diff_eq!(total, 2.0 * PI, epsilon = 1e-12);
			for pair in segments.windows(2) {
				assert_abs_diff_eq!(pair[0].end_angle, pair[1].start_angle, epsilon = 1e-12);
			}
			assert_abs_diff_eq!(
				segments[6].end_angle - 2.0 * PI,
				segments[0].start_angle,
				epsilon = 1e-12
			);
		}
	}

	#[test]
	fn monday_is_at_the_top() {
		let segments = day_segments(Point::new(0.0, 0.0), 1.0);
		assert_abs_diff_eq!(segments[0].angle, -PI / 2.0);
		let top = segments[0].anchor(10.0);
		assert_abs_diff_eq!(top.x, 0.0, epsilon = 1e-12);
		assert_abs_diff_eq!(top.y, -10.0, epsilon = 1e-12);
	}

	#[test]
	fn slot_and_rank_shape_the_position() {
		let center = Point::new(0.0, 0.0);
		let segment = day_segments(center, 100.0)[2];
		let params = RadialParams::default();
		let single = DayRank { index: 0, count: 1 };

		let morning = node_position_in_segment(TimeSlot::Morning, &segment, single, params);
		let evening = node_position_in_segment(TimeSlot::Evening, &segment, single, params);
		assert_abs_diff_eq!(morning.distance(center), 100.0, epsilon = 1e-9);
		let m_angle = morning.y.atan2(morning.x);
		let e_angle = evening.y.atan2(evening.x);
		assert_abs_diff_eq!(m_angle, segment.angle - 0.3 * SEGMENT_ANGLE, epsilon = 1e-9);
		assert_abs_diff_eq!(e_angle, segment.angle + 0.3 * SEGMENT_ANGLE, epsilon = 1e-9);

		let rank = |index| DayRank { index, count: 3 };
		let first = node_position_in_segment(TimeSlot::Morning, &segment, rank(0), params);
		let last = node_position_in_segment(TimeSlot::Morning, &segment, rank(2), params);
		assert_abs_diff_eq!(first.distance(center), 85.0, epsilon = 1e-9);
		assert_abs_diff_eq!(last.distance(center), 115.0, epsilon = 1e-9);
	}

	#[test]
	fn sequence_in_day_orders_nodes_not_array_order() {
		let slot = |seq| ScheduleSlot {
			day: Day::Friday,
			time_slot: TimeSlot::Evening,
			sequence_in_day: seq,
		};
		let mut nodes = vec![
			GraphNode::new(1u32, "late", 1).with_slot(slot(2)),
			GraphNode::new(2u32, "early", 1).with_slot(slot(0)),
			GraphNode::new(3u32, "middle", 1).with_slot(slot(1)),
			GraphNode::new(4u32, "loose", 1),
		];
		let center = Point::new(10.0, 10.0);
		radial_layout(&mut nodes, center, 100.0, RadialParams::default());
		let r = |i: usize| nodes[i].position.unwrap().distance(center);
		assert_abs_diff_eq!(r(1), 85.0, epsilon = 1e-9);
		assert_abs_diff_eq!(r(2), 100.0, epsilon = 1e-9);
		assert_abs_diff_eq!(r(0), 115.0, epsilon = 1e-9);
		assert_eq!(nodes[3].position, Some(center));

		let edges = derive_weekly_edges(&nodes, &[]);
		let chain: Vec<_> = edges
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect();
		assert_eq!(chain, vec![("2", "3"), ("3", "1")]);
	}

	#[test]
	fn monday_scenario_edges() {
		let schedule = BTreeMap::from([
			(Day::Monday, routine(&["Cleanser", "Toner"], &["Retinol Serum"])),
			(Day::Tuesday, routine(&["Cleanser"], &[])),
		]);
		let nodes = build_weekly_nodes(&schedule, |_| None);
		let edges = derive_weekly_edges(&nodes, &[]);

		let same_day: Vec<_> = edges
			.iter()
			.filter(|e| e.kind == EdgeKind::SameDay)
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect();
		assert_eq!(same_day, vec![("1", "2"), ("2", "3")]);

		let adjacent: Vec<_> = edges
			.iter()
			.filter(|e| e.kind == EdgeKind::AdjacentDay)
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect();
		assert_eq!(adjacent, vec![("3", "4")]);
	}

	#[test]
	fn full_week_has_six_hand_offs_without_wrap() {
		let schedule: BTreeMap<_, _> = Day::ALL
			.iter()
			.map(|&d| (d, routine(&["Cleanser"], &["Moisturizer"])))
			.collect();
		let nodes = build_weekly_nodes(&schedule, |_| Some(1));
		let edges = derive_weekly_edges(&nodes, &[]);
		assert_eq!(count(&edges, &EdgeKind::AdjacentDay), 6);
		assert_eq!(count(&edges, &EdgeKind::SameDay), 7);
		assert!(
			!edges
				.iter()
				.any(|e| e.kind == EdgeKind::AdjacentDay && e.source.as_str() == "14")
		);
	}

	#[test]
	fn empty_day_breaks_the_hand_off() {
		let schedule = BTreeMap::from([
			(Day::Monday, routine(&["Cleanser"], &[])),
			(Day::Wednesday, routine(&["Cleanser"], &[])),
		]);
		let nodes = build_weekly_nodes(&schedule, |_| None);
		assert_eq!(count(&derive_weekly_edges(&nodes, &[]), &EdgeKind::AdjacentDay), 0);
	}

	#[test]
	fn conflicts_expand_across_occurrences() {
		let schedule = BTreeMap::from([
			(Day::Monday, routine(&["Vitamin C Serum"], &["Retinol Serum"])),
			(Day::Tuesday, routine(&["Vitamin C Serum"], &["Retinol Serum"])),
		]);
		let nodes = build_weekly_nodes(&schedule, |_| None);
		let conflicts = [
			conflict("Vitamin C Serum", "Retinol Serum"),
			conflict("Retinol Serum", "Retinol Serum"),
			conflict("Clay Mask", "Retinol Serum"),
		];
		let edges = derive_weekly_edges(&nodes, &conflicts);
		// 2x2 occurrence pairs, plus the two cross-day self-name pairs.
		assert_eq!(count(&edges, &EdgeKind::weekly_conflict()), 4 + 2);
		assert!(edges.iter().all(|e| e.source != e.target));
	}

	#[test]
	fn colour_groups_default_to_one() {
		let schedule = BTreeMap::from([(Day::Sunday, routine(&["Toner"], &["Mystery"]))]);
		let nodes = build_weekly_nodes(&schedule, |name| (name == "Toner").then_some(3));
		assert_eq!(nodes[0].color_group, 3);
		assert_eq!(nodes[1].color_group, 1);
		assert_eq!(nodes[1].slot.unwrap().sequence_in_day, 1);
	}

	#[test]
	fn focus_rotation_is_negated_center_angle() {
		assert_abs_diff_eq!(focus_rotation_degrees(Day::Monday), 90.0, epsilon = 1e-9);
		assert_abs_diff_eq!(
			focus_rotation_degrees(Day::Thursday),
			90.0 - 3.0 * 360.0 / 7.0,
			epsilon = 1e-9
		);
	}

	#[test]
	fn day_focus_eases_in_then_reverts() {
		let mut focus = DayFocus::default();
		assert_eq!(focus.advance(0.0), 0.0);
		focus.start(90.0, 1000.0, 500.0, 3000.0);
		assert_eq!(focus.advance(1000.0), 0.0);
		assert_abs_diff_eq!(focus.advance(1250.0), 45.0, epsilon = 1e-9);
		assert_eq!(focus.advance(1500.0), 90.0);
		assert_eq!(focus.advance(3999.0), 90.0);
		assert!(!focus.is_settled(3999.0));
		assert_eq!(focus.advance(4000.0), 90.0);
		assert_eq!(focus.advance(4500.0), 0.0);
		assert!(focus.is_settled(4500.0));
	}

	#[test]
	fn day_focus_cancel_and_restart() {
		let mut focus = DayFocus::default();
		focus.start(90.0, 0.0, 500.0, 3000.0);
		focus.advance(500.0);
		focus.start(-30.0, 600.0, 500.0, 3000.0);
		assert_eq!(focus.advance(600.0), 90.0);
		assert_eq!(focus.advance(1100.0), -30.0);
		focus.cancel();
		assert_eq!(focus.advance(1200.0), 0.0);
		assert!(focus.is_settled(1200.0));
	}

	#[test]
	fn stats_count_by_kind_day_and_slot() {
		let schedule = BTreeMap::from([
			(Day::Monday, routine(&["Vitamin C Serum"], &["Retinol Serum"])),
			(Day::Tuesday, routine(&["Cleanser"], &[])),
		]);
		let weekly = build_weekly_graph(
			&schedule,
			|name| (name == "Cleanser").then_some(2),
			&[conflict("Vitamin C Serum", "Retinol Serum")],
			6,
			"0.008s",
		);
		let stats = WeeklyStats::of(&weekly);
		assert_eq!(stats.total_nodes, 3);
		assert_eq!(stats.same_day_edges, 1);
		assert_eq!(stats.adjacent_day_edges, 1);
		assert_eq!(stats.conflict_edges, 1);
		assert_eq!(stats.total_edges, 3);
		assert_eq!(stats.nodes_by_day[&Day::Monday], 2);
		assert_eq!(stats.nodes_by_day[&Day::Sunday], 0);
		assert_eq!((stats.morning_nodes, stats.evening_nodes), (2, 1));
		assert_eq!(stats.color_groups[&1], 2);
		assert_eq!(stats.color_groups[&2], 1);
		assert_eq!(stats.computation_time, "0.008s");
	}
}
