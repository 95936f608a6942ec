use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable node identity. Numeric ids from the weekly graph are kept as their
/// decimal string so both graph variants share one key space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Text(String),
			Number(serde_json::Number),
		}

		Ok(match Raw::deserialize(deserializer)? {
			Raw::Text(s) => NodeId(s),
			Raw::Number(n) => NodeId(n.to_string()),
		})
	}
}

impl NodeId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<u32> for NodeId {
	fn from(value: u32) -> Self {
		Self(value.to_string())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

impl std::ops::Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl std::ops::Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
	Monday,
	Tuesday,
	Wednesday,
	Thursday,
	Friday,
	Saturday,
	Sunday,
}

impl Day {
	pub const ALL: [Day; 7] = [
		Day::Monday,
		Day::Tuesday,
		Day::Wednesday,
		Day::Thursday,
		Day::Friday,
		Day::Saturday,
		Day::Sunday,
	];

	/// Position in the week, Monday = 0.
	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Day> {
		Self::ALL.get(index).copied()
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Day::Monday => "monday",
			Day::Tuesday => "tuesday",
			Day::Wednesday => "wednesday",
			Day::Thursday => "thursday",
			Day::Friday => "friday",
			Day::Saturday => "saturday",
			Day::Sunday => "sunday",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Day::Monday => "Mon",
			Day::Tuesday => "Tue",
			Day::Wednesday => "Wed",
			Day::Thursday => "Thu",
			Day::Friday => "Fri",
			Day::Saturday => "Sat",
			Day::Sunday => "Sun",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
	Morning,
	Evening,
}

/// Where a weekly node sits in the schedule. `sequence_in_day` is the
/// explicit ordering key used by both edge derivation and radial placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
	pub day: Day,
	pub time_slot: TimeSlot,
	pub sequence_in_day: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: NodeId,
	pub name: String,
	#[serde(default = "default_color_group")]
	pub color_group: u32,
	#[serde(default)]
	pub degree: Option<u32>,
	#[serde(default)]
	pub position: Option<Point>,
	#[serde(default)]
	pub slot: Option<ScheduleSlot>,
}

fn default_color_group() -> u32 {
	1
}

impl GraphNode {
	pub fn new(id: impl Into<NodeId>, name: impl Into<String>, color_group: u32) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			color_group,
			degree: None,
			position: None,
			slot: None,
		}
	}

	pub fn with_degree(mut self, degree: u32) -> Self {
		self.degree = Some(degree);
		self
	}

	pub fn with_slot(mut self, slot: ScheduleSlot) -> Self {
		self.slot = Some(slot);
		self
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Low,
	Medium,
	High,
	#[serde(other)]
	Unknown,
}

impl Severity {
	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Low => "low",
			Severity::Medium => "medium",
			Severity::High => "high",
			Severity::Unknown => "unknown",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EdgeKind {
	/// Conflict graph edges carry a severity; weekly conflict edges don't.
	Conflict {
		#[serde(default)]
		severity: Option<Severity>,
		#[serde(default)]
		mechanism: Option<String>,
	},
	SameDay,
	AdjacentDay,
	#[serde(other)]
	Unknown,
}

impl EdgeKind {
	pub fn conflict(severity: Severity, mechanism: impl Into<String>) -> Self {
		EdgeKind::Conflict {
			severity: Some(severity),
			mechanism: Some(mechanism.into()),
		}
	}

	pub fn weekly_conflict() -> Self {
		EdgeKind::Conflict {
			severity: None,
			mechanism: None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			EdgeKind::Conflict { .. } => "conflict",
			EdgeKind::SameDay => "same-day",
			EdgeKind::AdjacentDay => "adjacent-day",
			EdgeKind::Unknown => "unknown",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: NodeId,
	pub target: NodeId,
	#[serde(flatten)]
	pub kind: EdgeKind,
}

impl GraphEdge {
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: EdgeKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
		}
	}

	pub fn touches(&self, id: &NodeId) -> bool {
		&self.source == id || &self.target == id
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

/// The seven-day variant. `chromatic_number` and `computation_time` are
/// display values computed elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGraph {
	#[serde(flatten)]
	pub graph: GraphData,
	pub chromatic_number: u32,
	pub computation_time: String,
}

/// A product-level conflict from the external conflict table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
	pub product_a: String,
	pub product_b: String,
	pub severity: Severity,
	pub mechanism: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRoutine {
	pub morning: Vec<String>,
	pub evening: Vec<String>,
}

/// Which closed-form placement a view uses before user overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
	#[default]
	Circular,
	WeeklyRadial,
}
