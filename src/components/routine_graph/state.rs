use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rand::Rng;

use super::config::GraphConfig;
use super::connectivity::{IncidenceIndex, connected_nodes, is_edge_highlighted};
use super::geometry::{
	EdgeStyle, apply_jitter, circular_layout, distance_to_segment, edge_visual_style, node_fill,
	node_radius,
};
use super::layout_store::{LayoutState, LayoutStore};
use super::radial::{RadialParams, day_segments, focus_rotation_degrees, radial_layout};
use super::scale::{ViewTransform, ZoomLimits, rotate_about};
use super::types::{Day, GraphData, GraphEdge, GraphNode, LayoutMode, NodeId, Point};
use super::visual::{EdgeVisual, Emphasis, Frame, NodeVisual, OpacityTier, SegmentVisual};

/// Screen pixels a press may travel before it stops counting as a click.
const CLICK_SLOP: f64 = 3.0;
/// Extra screen pixels around an edge stroke that still hit it.
const EDGE_HIT_SLOP: f64 = 4.0;

/// Raised towards the host; drained with [`GraphController::drain_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	NodeHover(Option<NodeId>),
	NodeClick(NodeId),
	EdgeHover(Option<usize>),
	NodeDrag {
		id: NodeId,
		x: f64,
		y: f64,
	},
	DaySelect(Day),
	/// The surface owns the animation; positions never change.
	FocusDay {
		day: Day,
		rotation_deg: f64,
		duration_ms: f64,
		revert_after_ms: f64,
	},
	ExportRequest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionPhase {
	Idle,
	HoveringNode(NodeId),
	HoveringEdge(usize),
	Dragging(NodeId),
}

/// Where the positions of the last activation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutSource {
	Fresh,
	Restored { nodes: usize },
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<NodeId>,
	pub edge: Option<usize>,
	pub highlighted: HashSet<NodeId>,
}

#[derive(Clone, Debug)]
pub struct DragState {
	pub node: NodeId,
	pub offset: Point,
	pub press: Point,
	pub moved: bool,
}

/// Background drag. Only the last pointer position is kept, so zooming
/// mid-pan composes with it.
#[derive(Clone, Debug)]
pub struct PanState {
	pub last: Point,
}

/// Transient interaction state for one graph view, plus the positions it
/// owns. All transitions run synchronously on the caller's thread.
pub struct GraphController {
	config: GraphConfig,
	mode: LayoutMode,
	store: LayoutStore,
	dataset: String,
	nodes: Vec<GraphNode>,
	index: HashMap<NodeId, usize>,
	degrees: Vec<u32>,
	edges: Vec<GraphEdge>,
	styles: Vec<EdgeStyle>,
	incidence: IncidenceIndex,
	transform: ViewTransform,
	/// Drawing-only turn about the layout centre, in degrees.
	rotation_deg: f64,
	limits: ZoomLimits,
	hover: HoverState,
	selected: Option<NodeId>,
	focused: Option<usize>,
	selected_day: Option<Day>,
	drag: Option<DragState>,
	pan: Option<PanState>,
	width: f64,
	height: f64,
	events: Vec<GraphEvent>,
}

impl GraphController {
	pub fn new(config: GraphConfig, mode: LayoutMode, store: LayoutStore, width: f64, height: f64) -> Self {
		let limits = ZoomLimits {
			min: config.min_zoom,
			max: config.max_zoom,
		};
		Self {
			config,
			mode,
			store,
			dataset: String::new(),
			nodes: Vec::new(),
			index: HashMap::new(),
			degrees: Vec::new(),
			edges: Vec::new(),
			styles: Vec::new(),
			incidence: IncidenceIndex::default(),
			transform: ViewTransform::IDENTITY,
			rotation_deg: 0.0,
			limits,
			hover: HoverState::default(),
			selected: None,
			focused: None,
			selected_day: None,
			drag: None,
			pan: None,
			width,
			height,
			events: Vec::new(),
		}
	}

	/// Loads `graph` under `dataset`: persisted positions when the store has
	/// them, a fresh closed-form layout otherwise. The result is written back.
	pub fn activate(&mut self, dataset: &str, graph: GraphData) -> LayoutSource {
		self.activate_with_rng(dataset, graph, &mut rand::thread_rng())
	}

	pub fn activate_with_rng<R: Rng + ?Sized>(
		&mut self,
		dataset: &str,
		graph: GraphData,
		rng: &mut R,
	) -> LayoutSource {
		let GraphData { mut nodes, edges } = graph;
		self.reset_interaction();
		self.dataset = dataset.to_owned();

		let preset: Vec<Option<Point>> = nodes.iter().map(|n| n.position).collect();
		let center = self.center();
		let extent = self.width.min(self.height);
		match self.mode {
			LayoutMode::Circular => {
				circular_layout(&mut nodes, center, extent * self.config.circular_radius_fraction);
				apply_jitter(&mut nodes, self.config.jitter, rng);
			}
			LayoutMode::WeeklyRadial => radial_layout(
				&mut nodes,
				center,
				extent * self.config.radial_radius_fraction,
				self.radial_params(),
			),
		}
		for (node, preset) in nodes.iter_mut().zip(preset) {
			if preset.is_some() {
				node.position = preset;
			}
		}

		let source = match self.store.load(dataset) {
			Some(layout) => LayoutSource::Restored {
				nodes: layout.apply_to(&mut nodes),
			},
			None => LayoutSource::Fresh,
		};

		self.index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		let dangling = edges
			.iter()
			.filter(|e| !self.index.contains_key(&e.source) || !self.index.contains_key(&e.target))
			.count();
		if dangling > 0 {
			warn!("{dangling} edges in {dataset} reference unknown nodes and will not be drawn");
		}
		self.incidence = IncidenceIndex::build(&edges);
		self.degrees = nodes
			.iter()
			.map(|n| {
				n.degree.unwrap_or_else(|| {
					self.incidence
						.edges_of(&n.id)
						.iter()
						.filter(|&&i| edges[i].source != edges[i].target)
						.count() as u32
				})
			})
			.collect();
		self.styles = edges.iter().map(|e| edge_visual_style(&e.kind)).collect();
		self.nodes = nodes;
		self.edges = edges;

		debug!(
			"Activated {dataset}: {} nodes, {} edges, layout {source:?}",
			self.nodes.len(),
			self.edges.len()
		);
		self.persist();
		source
	}

	fn reset_interaction(&mut self) {
		self.hover = HoverState::default();
		self.selected = None;
		self.focused = None;
		self.selected_day = None;
		self.drag = None;
		self.pan = None;
		self.transform = ViewTransform::IDENTITY;
		self.rotation_deg = 0.0;
	}

	fn radial_params(&self) -> RadialParams {
		RadialParams {
			spacing: self.config.in_day_spacing,
			slot_offset: self.config.time_slot_offset,
		}
	}

	fn persist(&self) {
		self.store.save(&self.dataset, &LayoutState::from_nodes(&self.nodes));
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Sets the rotation the surface currently draws with, so picking
	/// matches what is on screen. Positions are unaffected.
	pub fn set_rotation(&mut self, degrees: f64) {
		self.rotation_deg = degrees;
	}

	pub fn rotation(&self) -> f64 {
		self.rotation_deg
	}

	/// Screen point the drawing rotates about: the layout centre.
	pub fn rotation_pivot(&self) -> Point {
		self.transform.graph_to_screen(self.center())
	}

	/// Screen to graph space, undoing the drawn rotation first.
	fn to_graph(&self, screen: Point) -> Point {
		let unrotated = rotate_about(screen, self.rotation_pivot(), -self.rotation_deg);
		self.transform.screen_to_graph(unrotated)
	}

	pub fn dataset(&self) -> &str {
		&self.dataset
	}

	pub fn mode(&self) -> LayoutMode {
		self.mode
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn hover(&self) -> &HoverState {
		&self.hover
	}

	pub fn highlighted(&self) -> &HashSet<NodeId> {
		&self.hover.highlighted
	}

	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	pub fn selected_day(&self) -> Option<Day> {
		self.selected_day
	}

	pub fn focused(&self) -> Option<&NodeId> {
		self.focused.map(|i| &self.nodes[i].id)
	}

	pub fn dragged(&self) -> Option<&NodeId> {
		self.drag.as_ref().map(|d| &d.node)
	}

	pub fn phase(&self) -> InteractionPhase {
		if let Some(drag) = &self.drag {
			InteractionPhase::Dragging(drag.node.clone())
		} else if let Some(node) = &self.hover.node {
			InteractionPhase::HoveringNode(node.clone())
		} else if let Some(edge) = self.hover.edge {
			InteractionPhase::HoveringEdge(edge)
		} else {
			InteractionPhase::Idle
		}
	}

	/// Graph-space position, falling back to the view centre when unplaced.
	pub fn node_position(&self, id: &NodeId) -> Option<Point> {
		self.index.get(id).map(|&i| self.position_of(i))
	}

	fn position_of(&self, i: usize) -> Point {
		self.nodes[i].position.unwrap_or_else(|| self.center())
	}

	/// Graph-space radius; also the hit area.
	fn radius_of(&self, i: usize) -> f64 {
		match self.mode {
			LayoutMode::Circular => node_radius(
				self.degrees[i],
				self.config.node_base_radius,
				self.config.node_radius_per_degree,
			),
			LayoutMode::WeeklyRadial => self.config.weekly_node_radius,
		}
	}

	/// Indices of the edges that move with `id`.
	pub fn edges_touching(&self, id: &NodeId) -> &[usize] {
		self.incidence.edges_of(id)
	}

	pub fn drain_events(&mut self) -> Vec<GraphEvent> {
		std::mem::take(&mut self.events)
	}

	pub fn node_at(&self, screen: Point) -> Option<usize> {
		let p = self.to_graph(screen);
		(0..self.nodes.len())
			.rev()
			.find(|&i| self.position_of(i).distance(p) < self.radius_of(i))
	}

	pub fn edge_at(&self, screen: Point) -> Option<usize> {
		let p = self.to_graph(screen);
		self.edges.iter().enumerate().rev().find_map(|(i, e)| {
			let (a, b) = (self.index.get(&e.source)?, self.index.get(&e.target)?);
			let tolerance = (self.styles[i].width / 2.0 + EDGE_HIT_SLOP) / self.transform.k;
			(distance_to_segment(p, self.position_of(*a), self.position_of(*b)) <= tolerance)
				.then_some(i)
		})
	}

	pub fn pointer_enter(&mut self, id: &NodeId) {
		if !self.index.contains_key(id) || self.hover.node.as_ref() == Some(id) {
			return;
		}
		// Pointer capture: while dragging only the dragged node may be hovered.
		if self.drag.as_ref().is_some_and(|d| &d.node != id) {
			return;
		}
		let mut highlighted = connected_nodes(id, &self.edges);
		highlighted.insert(id.clone());
		self.hover.node = Some(id.clone());
		self.hover.highlighted = highlighted;
		self.events.push(GraphEvent::NodeHover(Some(id.clone())));
	}

	pub fn pointer_leave(&mut self, id: &NodeId) {
		if self.hover.node.as_ref() != Some(id) {
			return;
		}
		self.hover.node = None;
		self.hover.highlighted.clear();
		self.events.push(GraphEvent::NodeHover(None));
	}

	pub fn edge_enter(&mut self, index: usize) {
		if index >= self.edges.len() || self.hover.edge == Some(index) {
			return;
		}
		self.hover.edge = Some(index);
		self.events.push(GraphEvent::EdgeHover(Some(index)));
	}

	pub fn edge_leave(&mut self, index: usize) {
		if self.hover.edge != Some(index) {
			return;
		}
		self.hover.edge = None;
		self.events.push(GraphEvent::EdgeHover(None));
	}

	/// Press on a node or on the background, decided by hit testing.
	pub fn pointer_down(&mut self, screen: Point) {
		match self.node_at(screen) {
			Some(i) => {
				let id = self.nodes[i].id.clone();
				self.pointer_down_on_node(&id, screen);
			}
			None => {
				self.pan = Some(PanState { last: screen });
			}
		}
	}

	pub fn pointer_down_on_node(&mut self, id: &NodeId, screen: Point) {
		let Some(&i) = self.index.get(id) else {
			return;
		};
		if self.drag.is_some() {
			return;
		}
		let pointer = self.to_graph(screen);
		self.drag = Some(DragState {
			node: id.clone(),
			offset: pointer - self.position_of(i),
			press: screen,
			moved: false,
		});
	}

	pub fn pointer_move(&mut self, screen: Point) {
		let pointer = self.to_graph(screen);
		if let Some(drag) = self.drag.as_mut() {
			let position = pointer - drag.offset;
			drag.moved |= screen.distance(drag.press) > CLICK_SLOP;
			let id = drag.node.clone();
			if let Some(&i) = self.index.get(&id) {
				self.nodes[i].position = Some(position);
			}
			self.events.push(GraphEvent::NodeDrag {
				id,
				x: position.x,
				y: position.y,
			});
			return;
		}

		if let Some(pan) = self.pan.as_mut() {
			let delta = screen - pan.last;
			pan.last = screen;
			self.transform.pan_by(delta.x, delta.y);
			return;
		}

		let node = self.node_at(screen).map(|i| self.nodes[i].id.clone());
		if let Some(current) = self.hover.node.clone() {
			if node.as_ref() != Some(&current) {
				self.pointer_leave(&current);
			}
		}
		if let Some(id) = &node {
			self.pointer_enter(id);
		}

		let edge = if node.is_some() {
			None
		} else {
			self.edge_at(screen)
		};
		if let Some(current) = self.hover.edge {
			if edge != Some(current) {
				self.edge_leave(current);
			}
		}
		if let Some(index) = edge {
			self.edge_enter(index);
		}
	}

	/// Ends a drag or pan. A press that never travelled is a click.
	pub fn pointer_up(&mut self) {
		self.pan = None;
		if let Some(drag) = self.finish_drag() {
			if !drag.moved {
				self.click(&drag.node);
			}
		}
	}

	/// Same as a release (the last position stands), and hover ends too.
	pub fn pointer_leave_canvas(&mut self) {
		self.pan = None;
		self.finish_drag();
		if let Some(id) = self.hover.node.clone() {
			self.pointer_leave(&id);
		}
		if let Some(index) = self.hover.edge {
			self.edge_leave(index);
		}
	}

	fn finish_drag(&mut self) -> Option<DragState> {
		let drag = self.drag.take()?;
		self.persist();
		Some(drag)
	}

	/// Toggles selection. The highlight set belongs to hover and is untouched.
	pub fn click(&mut self, id: &NodeId) {
		if !self.index.contains_key(id) {
			return;
		}
		if self.selected.as_ref() == Some(id) {
			self.selected = None;
		} else {
			self.selected = Some(id.clone());
		}
		self.events.push(GraphEvent::NodeClick(id.clone()));
	}

	pub fn focus_node(&mut self, id: &NodeId) {
		if let Some(&i) = self.index.get(id) {
			self.focused = Some(i);
		}
	}

	/// Moves keyboard focus to the next node. Stepping past the last node
	/// clears focus and returns false, so focus can leave the canvas.
	pub fn focus_next(&mut self) -> bool {
		let next = self.focused.map_or(0, |i| i + 1);
		self.focused = (next < self.nodes.len()).then_some(next);
		self.focused.is_some()
	}

	/// Mirror of [`focus_next`](Self::focus_next); entering from outside
	/// lands on the last node.
	pub fn focus_prev(&mut self) -> bool {
		self.focused = match self.focused {
			None => self.nodes.len().checked_sub(1),
			Some(i) => i.checked_sub(1),
		};
		self.focused.is_some()
	}

	pub fn blur(&mut self) {
		self.focused = None;
	}

	/// Returns true when the key was consumed.
	pub fn key_down(&mut self, key: &str) -> bool {
		match key {
			"Enter" | " " => {
				let Some(i) = self.focused else {
					return false;
				};
				let id = self.nodes[i].id.clone();
				self.click(&id);
				true
			}
			_ => false,
		}
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		let step = self.config.wheel_zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		let k = self.transform.k * factor;
		self.limits.zoom_about(&mut self.transform, screen, k);
	}

	/// Zooms about the viewport centre, clamped to the configured range.
	pub fn set_scale(&mut self, k: f64) {
		let center = self.center();
		self.limits.zoom_about(&mut self.transform, center, k);
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transform.pan_by(dx, dy);
	}

	pub fn select_day(&mut self, day: Day) {
		self.selected_day = Some(day);
		self.events.push(GraphEvent::DaySelect(day));
		if self.mode == LayoutMode::WeeklyRadial {
			self.events.push(GraphEvent::FocusDay {
				day,
				rotation_deg: focus_rotation_degrees(day),
				duration_ms: self.config.focus_duration_ms,
				revert_after_ms: self.config.focus_revert_ms,
			});
		}
	}

	pub fn request_export(&mut self) {
		self.events.push(GraphEvent::ExportRequest);
	}

	pub fn frame(&self) -> Frame {
		let t = &self.transform;
		let highlighted = &self.hover.highlighted;

		let nodes = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let emphasis = if self.selected.as_ref() == Some(&node.id) {
					Emphasis::Selected
				} else if self.hover.node.as_ref() == Some(&node.id) {
					Emphasis::Hover
				} else {
					Emphasis::None
				};
				NodeVisual {
					id: node.id.clone(),
					position: t.graph_to_screen(self.position_of(i)),
					radius: self.radius_of(i) * t.k,
					fill: node_fill(node.color_group),
					emphasis,
					highlighted: highlighted.contains(&node.id),
					focused: self.focused == Some(i),
					label: node.name.clone(),
					time_slot: node.slot.map(|s| s.time_slot),
				}
			})
			.collect();

		let edges = self
			.edges
			.iter()
			.enumerate()
			.filter_map(|(i, edge)| {
				let (a, b) = (self.index.get(&edge.source)?, self.index.get(&edge.target)?);
				let style = &self.styles[i];
				let tier = if is_edge_highlighted(edge, highlighted) {
					OpacityTier::Highlighted
				} else if highlighted.is_empty() {
					OpacityTier::Normal
				} else {
					OpacityTier::Dimmed
				};
				Some(EdgeVisual {
					index: i,
					from: t.graph_to_screen(self.position_of(*a)),
					to: t.graph_to_screen(self.position_of(*b)),
					color: style.color,
					width: if tier == OpacityTier::Highlighted {
						style.highlight_width
					} else {
						style.width
					},
					dash: style.dash,
					tier,
					opacity: tier.opacity(style.base_opacity),
					hovered: self.hover.edge == Some(i),
				})
			})
			.collect();

		let segments = match self.mode {
			LayoutMode::Circular => Vec::new(),
			LayoutMode::WeeklyRadial => {
				let extent = self.width.min(self.height);
				day_segments(self.center(), extent * self.config.wedge_radius_fraction)
					.iter()
					.map(|segment| {
						SegmentVisual::from_segment(
							segment,
							t,
							extent * self.config.day_label_radius_fraction,
							self.selected_day == Some(segment.day),
						)
					})
					.collect()
			}
		};

		Frame {
			nodes,
			edges,
			segments,
		}
	}
}
