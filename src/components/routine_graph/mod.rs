//! Conflict and weekly graph views: layout, interaction state, persistence and
//! the canvas surface that draws them.

mod component;
mod config;
mod connectivity;
mod geometry;
mod layout_store;
mod radial;
mod render;
mod scale;
mod state;
mod types;
mod visual;

pub use component::{ListenerGuard, RoutineGraphCanvas};
pub use config::{ConfigError, GraphConfig};
pub use connectivity::{IncidenceIndex, connected_nodes, degree_of, edge_between, is_edge_highlighted};
pub use geometry::{
	EdgeStyle, apply_jitter, circular_layout, distance_to_segment, edge_visual_style, node_fill,
	node_radius,
};
pub use layout_store::{
	BrowserStorage, LayoutState, LayoutStore, LayoutStoreError, MemoryStorage, StorageBackend,
};
pub use radial::{
	DayFocus, DayRank, DaySegment, RadialParams, SEGMENT_ANGLE, WeeklyStats, build_weekly_graph,
	build_weekly_nodes, day_segments, derive_weekly_edges, focus_rotation_degrees,
	node_position_in_segment, nodes_by_day, radial_layout, segment_center_angle,
};
pub use scale::{ViewTransform, ZoomLimits, rotate_about};
pub use state::{
	DragState, GraphController, GraphEvent, HoverState, InteractionPhase, LayoutSource, PanState,
};
pub use types::{
	Conflict, DailyRoutine, Day, EdgeKind, GraphData, GraphEdge, GraphNode, LayoutMode, NodeId,
	Point, ScheduleSlot, Severity, TimeSlot, WeeklyGraph,
};
pub use visual::{EdgeVisual, Emphasis, Frame, NodeVisual, OpacityTier, SegmentVisual};
