use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use skincare_graph_canvas::components::routine_graph::{
	Day, EdgeKind, GraphConfig, GraphController, GraphData, GraphEdge, GraphEvent, GraphNode,
	InteractionPhase, LayoutMode, LayoutSource, LayoutStore, LayoutStoreError, NodeId, OpacityTier,
	Point, Severity, StorageBackend, focus_rotation_degrees,
};
use skincare_graph_canvas::data::{self, SkinType};

fn abc() -> GraphData {
	GraphData {
		nodes: vec![
			GraphNode::new("A", "Vitamin C Serum", 2),
			GraphNode::new("B", "Retinol Serum", 4),
			GraphNode::new("C", "Cleanser", 1),
		],
		edges: vec![GraphEdge::new(
			"A",
			"B",
			EdgeKind::conflict(Severity::High, "pH destabilisation"),
		)],
	}
}

fn circular(store: &LayoutStore) -> GraphController {
	GraphController::new(
		GraphConfig::default(),
		LayoutMode::Circular,
		store.clone(),
		800.0,
		600.0,
	)
}

fn screen_of(controller: &GraphController, id: &str) -> Point {
	controller
		.frame()
		.node(&NodeId::from(id))
		.map(|n| n.position)
		.expect("node is drawn")
}

#[test]
fn hover_click_and_drag_a_conflict_pair() {
	let store = LayoutStore::memory("test", 1);
	let mut graph = circular(&store);
	graph.activate_with_rng("abc", abc(), &mut StdRng::seed_from_u64(1));

	let (a, b, c) = (NodeId::from("A"), NodeId::from("B"), NodeId::from("C"));
	let at_a = screen_of(&graph, "A");

	graph.pointer_move(at_a);
	assert_eq!(graph.phase(), InteractionPhase::HoveringNode(a.clone()));
	assert!(graph.highlighted().contains(&a));
	assert!(graph.highlighted().contains(&b));
	assert!(!graph.highlighted().contains(&c));
	let frame = graph.frame();
	let edge = frame.edge(0).expect("edge is drawn");
	assert_eq!(edge.tier, OpacityTier::Highlighted);
	assert_abs_diff_eq!(edge.opacity, 1.0);
	assert_eq!(edge.width, 3.0);
	assert_eq!(graph.drain_events(), vec![GraphEvent::NodeHover(Some(a.clone()))]);

	// A press that does not travel is a click.
	graph.pointer_down(at_a);
	graph.pointer_up();
	assert_eq!(graph.selected(), Some(&a));
	assert_eq!(graph.drain_events(), vec![GraphEvent::NodeClick(a.clone())]);

	let before = graph.node_position(&a).expect("A placed");
	graph.pointer_down(at_a);
	graph.pointer_move(at_a + Point::new(40.0, 0.0));
	graph.pointer_up();
	let after = graph.node_position(&a).expect("A placed");
	assert_abs_diff_eq!(after.x, before.x + 40.0, epsilon = 1e-9);
	assert_abs_diff_eq!(after.y, before.y, epsilon = 1e-9);

	let events = graph.drain_events();
	assert!(matches!(events.as_slice(), [GraphEvent::NodeDrag { id, .. }] if id == &a));
	// Selection survives a drag; only a click toggles it.
	assert_eq!(graph.selected(), Some(&a));

	let frame = graph.frame();
	let edge = frame.edge(0).expect("edge is drawn");
	assert_abs_diff_eq!(edge.from.x, after.x, epsilon = 1e-9);
	assert_eq!(graph.edges_touching(&a), &[0]);
	assert!(graph.edges_touching(&c).is_empty());
}

#[test]
fn layout_survives_a_reload() {
	let store = LayoutStore::memory("test", 1);
	let mut first = circular(&store);
	assert_eq!(
		first.activate_with_rng("normal", abc(), &mut StdRng::seed_from_u64(7)),
		LayoutSource::Fresh
	);
	let at_c = screen_of(&first, "C");
	first.pointer_down(at_c);
	first.pointer_move(at_c + Point::new(-25.5, 12.25));
	first.pointer_leave_canvas();

	// A different seed would jitter differently; the stored layout wins.
	let mut second = circular(&store);
	assert_eq!(
		second.activate_with_rng("normal", abc(), &mut StdRng::seed_from_u64(99)),
		LayoutSource::Restored { nodes: 3 }
	);
	for id in ["A", "B", "C"] {
		let id = NodeId::from(id);
		let (p, q) = (
			first.node_position(&id).expect("placed"),
			second.node_position(&id).expect("placed"),
		);
		assert_abs_diff_eq!(p.x, q.x, epsilon = 1e-9);
		assert_abs_diff_eq!(p.y, q.y, epsilon = 1e-9);
	}

	// Layouts are kept per dataset.
	let mut other = circular(&store);
	assert_eq!(
		other.activate_with_rng("oily", abc(), &mut StdRng::seed_from_u64(7)),
		LayoutSource::Fresh
	);
}

/// Storage the browser refuses outright, as in private mode with quota 0.
struct DeniedStorage;

impl StorageBackend for DeniedStorage {
	fn get(&self, _key: &str) -> Result<Option<String>, LayoutStoreError> {
		Err(LayoutStoreError::Unavailable("denied".into()))
	}

	fn set(&self, _key: &str, _value: &str) -> Result<(), LayoutStoreError> {
		Err(LayoutStoreError::Unavailable("denied".into()))
	}
}

#[test]
fn denied_storage_still_keeps_layouts_for_the_session() {
	let store = LayoutStore::new(DeniedStorage, "test", 1);
	let mut graph = circular(&store);
	graph.activate_with_rng("normal", abc(), &mut StdRng::seed_from_u64(5));
	assert!(store.is_degraded());

	let c = NodeId::from("C");
	let at_c = screen_of(&graph, "C");
	graph.pointer_down(at_c);
	graph.pointer_move(at_c + Point::new(100.0, 100.0));
	graph.pointer_up();
	let dragged = graph.node_position(&c).expect("C placed");

	graph.activate_with_rng("oily", abc(), &mut StdRng::seed_from_u64(6));
	assert_eq!(
		graph.activate_with_rng("normal", abc(), &mut StdRng::seed_from_u64(7)),
		LayoutSource::Restored { nodes: 3 }
	);
	let restored = graph.node_position(&c).expect("C placed");
	assert_abs_diff_eq!(restored.x, dragged.x, epsilon = 1e-9);
	assert_abs_diff_eq!(restored.y, dragged.y, epsilon = 1e-9);
}

#[test]
fn zoom_stays_within_limits() {
	let store = LayoutStore::memory("test", 1);
	let mut graph = circular(&store);
	graph.activate_with_rng("abc", abc(), &mut StdRng::seed_from_u64(3));

	for _ in 0..50 {
		graph.wheel(Point::new(100.0, 100.0), -1.0);
	}
	assert_abs_diff_eq!(graph.transform().k, 3.0);
	graph.set_scale(0.01);
	assert_abs_diff_eq!(graph.transform().k, 0.5);

	// Picking still works through the transform.
	let at_b = screen_of(&graph, "B");
	assert_eq!(graph.node_at(at_b).map(|i| graph.nodes()[i].id.clone()), Some(NodeId::from("B")));
}

#[test]
fn weekly_view_focuses_a_day() {
	let store = LayoutStore::memory("test", 1);
	let mut graph = GraphController::new(
		GraphConfig::default(),
		LayoutMode::WeeklyRadial,
		store,
		800.0,
		800.0,
	);
	let weekly = data::weekly_graph(SkinType::Normal);
	let total = weekly.graph.nodes.len();
	graph.activate("weekly_normal", weekly.graph);

	let frame = graph.frame();
	assert_eq!(frame.segments.len(), 7);
	assert_eq!(frame.nodes.len(), total);
	assert!(frame.segments.iter().all(|s| !s.selected));

	let monday = graph.node_position(&NodeId::from(1u32)).expect("placed");
	graph.select_day(Day::Monday);
	assert_eq!(
		graph.drain_events(),
		vec![
			GraphEvent::DaySelect(Day::Monday),
			GraphEvent::FocusDay {
				day: Day::Monday,
				rotation_deg: focus_rotation_degrees(Day::Monday),
				duration_ms: 500.0,
				revert_after_ms: 3000.0,
			},
		]
	);
	let frame = graph.frame();
	let selected: Vec<Day> = frame.segments.iter().filter(|s| s.selected).map(|s| s.day).collect();
	assert_eq!(selected, vec![Day::Monday]);
	// Focusing rotates the drawing, never the positions.
	assert_eq!(graph.node_position(&NodeId::from(1u32)), Some(monday));
}

#[test]
fn conflict_view_ignores_day_focus() {
	let store = LayoutStore::memory("test", 1);
	let mut graph = circular(&store);
	graph.activate("normal", data::conflict_graph(SkinType::Normal));
	graph.select_day(Day::Friday);
	assert_eq!(graph.drain_events(), vec![GraphEvent::DaySelect(Day::Friday)]);
	assert!(graph.frame().segments.is_empty());

	graph.request_export();
	assert_eq!(graph.drain_events(), vec![GraphEvent::ExportRequest]);
}
