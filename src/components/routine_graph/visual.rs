//! What the canvas paints each frame. All coordinates are screen space.

use super::radial::DaySegment;
use super::scale::ViewTransform;
use super::types::{Day, NodeId, Point, TimeSlot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	None,
	Hover,
	Selected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpacityTier {
	/// Another node's neighbourhood is highlighted.
	Dimmed,
	Normal,
	Highlighted,
}

impl OpacityTier {
	pub fn opacity(self, base: f64) -> f64 {
		match self {
			OpacityTier::Dimmed => base * 0.5,
			OpacityTier::Normal => base,
			OpacityTier::Highlighted => 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub id: NodeId,
	pub position: Point,
	pub radius: f64,
	pub fill: &'static str,
	pub emphasis: Emphasis,
	pub highlighted: bool,
	pub focused: bool,
	pub label: String,
	pub time_slot: Option<TimeSlot>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	/// Index into the activated edge list.
	pub index: usize,
	pub from: Point,
	pub to: Point,
	pub color: &'static str,
	pub width: f64,
	pub dash: Option<[f64; 2]>,
	pub tier: OpacityTier,
	pub opacity: f64,
	pub hovered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentVisual {
	pub day: Day,
	pub start_angle: f64,
	pub end_angle: f64,
	pub center: Point,
	pub outer_radius: f64,
	pub label_at: Point,
	pub selected: bool,
}

impl SegmentVisual {
	pub fn from_segment(
		segment: &DaySegment,
		transform: &ViewTransform,
		label_radius: f64,
		selected: bool,
	) -> Self {
		Self {
			day: segment.day,
			start_angle: segment.start_angle,
			end_angle: segment.end_angle,
			center: transform.graph_to_screen(segment.center),
			outer_radius: segment.radius * transform.k,
			label_at: transform.graph_to_screen(segment.anchor(label_radius)),
			selected,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	pub nodes: Vec<NodeVisual>,
	pub edges: Vec<EdgeVisual>,
	pub segments: Vec<SegmentVisual>,
}

impl Frame {
	pub fn node(&self, id: &NodeId) -> Option<&NodeVisual> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn edge(&self, index: usize) -> Option<&EdgeVisual> {
		self.edges.iter().find(|e| e.index == index)
	}
}
