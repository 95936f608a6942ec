use std::collections::{HashMap, HashSet};

use super::types::{GraphEdge, NodeId};

/// Direct neighbours of `id`, treating edges as undirected. Self-loops never
/// add `id` itself.
pub fn connected_nodes(id: &NodeId, edges: &[GraphEdge]) -> HashSet<NodeId> {
	let mut connected = HashSet::new();
	for edge in edges {
		if &edge.source == id && &edge.target != id {
			connected.insert(edge.target.clone());
		} else if &edge.target == id && &edge.source != id {
			connected.insert(edge.source.clone());
		}
	}
	connected
}

/// An edge lights up only when both endpoints are in the set.
pub fn is_edge_highlighted(edge: &GraphEdge, highlighted: &HashSet<NodeId>) -> bool {
	highlighted.contains(&edge.source) && highlighted.contains(&edge.target)
}

pub fn degree_of(id: &NodeId, edges: &[GraphEdge]) -> u32 {
	edges
		.iter()
		.filter(|e| e.touches(id) && e.source != e.target)
		.count() as u32
}

pub fn edge_between<'a>(a: &NodeId, b: &NodeId, edges: &'a [GraphEdge]) -> Option<&'a GraphEdge> {
	edges
		.iter()
		.find(|e| (&e.source == a && &e.target == b) || (&e.source == b && &e.target == a))
}

/// Node id to the indices of its incident edges, so a drag step only
/// revisits the edges that moved.
#[derive(Clone, Debug, Default)]
pub struct IncidenceIndex {
	incident: HashMap<NodeId, Vec<usize>>,
}

impl IncidenceIndex {
	pub fn build(edges: &[GraphEdge]) -> Self {
		let mut incident: HashMap<NodeId, Vec<usize>> = HashMap::new();
		for (i, edge) in edges.iter().enumerate() {
			incident.entry(edge.source.clone()).or_default().push(i);
			if edge.target != edge.source {
				incident.entry(edge.target.clone()).or_default().push(i);
			}
		}
		Self { incident }
	}

	pub fn edges_of(&self, id: &NodeId) -> &[usize] {
		self.incident.get(id).map(Vec::as_slice).unwrap_or(&[])
	}
}
