//! Built-in datasets: the product and conflict tables, colour groups and the
//! weekly routines per skin type. Colour groups, degrees and chromatic numbers
//! are precomputed facts; nothing here derives them.

use std::collections::BTreeMap;

use crate::components::routine_graph::{
	Conflict, DailyRoutine, Day, EdgeKind, GraphData, GraphEdge, GraphNode, NodeId, Severity,
	WeeklyGraph, build_weekly_graph,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SkinType {
	#[default]
	Normal,
	Oily,
	Dry,
	Sensitive,
	Combination,
}

impl SkinType {
	pub const ALL: [SkinType; 5] = [
		SkinType::Normal,
		SkinType::Oily,
		SkinType::Dry,
		SkinType::Sensitive,
		SkinType::Combination,
	];

	/// Dataset key used for persisted layouts.
	pub fn key(self) -> &'static str {
		match self {
			SkinType::Normal => "normal",
			SkinType::Oily => "oily",
			SkinType::Dry => "dry",
			SkinType::Sensitive => "sensitive",
			SkinType::Combination => "combination",
		}
	}

	pub fn from_key(key: &str) -> Option<SkinType> {
		Self::ALL.into_iter().find(|s| s.key() == key)
	}

	pub fn label(self) -> &'static str {
		match self {
			SkinType::Normal => "Normal",
			SkinType::Oily => "Oily",
			SkinType::Dry => "Dry",
			SkinType::Sensitive => "Sensitive",
			SkinType::Combination => "Combination",
		}
	}
}

/// Product name, colour group, conflict degree.
const PRODUCTS: &[(&str, u32, u32)] = &[
	("Cleanser", 1, 0),
	("Toner", 1, 0),
	("Vitamin C Serum", 2, 3),
	("Niacinamide Serum", 3, 1),
	("Retinol Serum", 4, 3),
	("AHA/BHA Exfoliant", 5, 3),
	("Moisturizer", 1, 0),
	("Sunscreen", 2, 0),
	("Clay Mask", 6, 2),
	("Hydrating Mask", 4, 0),
];

const CONFLICTS: &[(&str, &str, Severity, &str)] = &[
	(
		"Vitamin C Serum",
		"Retinol Serum",
		Severity::High,
		"pH destabilisation, reduced efficacy",
	),
	(
		"Vitamin C Serum",
		"AHA/BHA Exfoliant",
		Severity::Medium,
		"Over-exfoliation, pH incompatibility",
	),
	(
		"Retinol Serum",
		"AHA/BHA Exfoliant",
		Severity::High,
		"Excess irritation, barrier damage",
	),
	(
		"Niacinamide Serum",
		"Vitamin C Serum (low pH)",
		Severity::Medium,
		"Possible nicotinic acid formation",
	),
	(
		"AHA/BHA Exfoliant",
		"Clay Mask",
		Severity::Medium,
		"Over-drying, irritation",
	),
	(
		"Retinol Serum",
		"Clay Mask",
		Severity::High,
		"Oxidative degradation",
	),
];

pub fn conflicts() -> Vec<Conflict> {
	CONFLICTS
		.iter()
		.map(|&(a, b, severity, mechanism)| Conflict {
			product_a: a.into(),
			product_b: b.into(),
			severity,
			mechanism: mechanism.into(),
		})
		.collect()
}

pub fn color_group(product: &str) -> Option<u32> {
	PRODUCTS
		.iter()
		.find(|(name, _, _)| *name == product)
		.map(|&(_, group, _)| group)
}

/// The product conflict graph. Every skin type currently shares it; layouts
/// are still stored per skin type.
pub fn conflict_graph(_skin: SkinType) -> GraphData {
	let nodes = PRODUCTS
		.iter()
		.map(|&(name, group, degree)| GraphNode::new(name, name, group).with_degree(degree))
		.collect();
	let edges = conflicts()
		.into_iter()
		.map(|c| GraphEdge::new(c.product_a, c.product_b, EdgeKind::conflict(c.severity, c.mechanism)))
		.collect();
	GraphData { nodes, edges }
}

fn week(morning: &[&str], evenings: [&[&str]; 7]) -> BTreeMap<Day, DailyRoutine> {
	Day::ALL
		.into_iter()
		.zip(evenings)
		.map(|(day, evening)| {
			(
				day,
				DailyRoutine {
					morning: morning.iter().map(|s| s.to_string()).collect(),
					evening: evening.iter().map(|s| s.to_string()).collect(),
				},
			)
		})
		.collect()
}

pub fn schedule(skin: SkinType) -> BTreeMap<Day, DailyRoutine> {
	const RETINOL: &[&str] = &["Cleanser", "Toner", "Retinol Serum", "Moisturizer"];
	const EXFOLIATE: &[&str] = &["Cleanser", "Toner", "AHA/BHA Exfoliant", "Moisturizer"];
	const BHA: &[&str] = &["Cleanser", "Toner", "BHA 2%", "Moisturizer"];
	const CLAY: &[&str] = &["Cleanser", "Toner", "Clay Mask", "Moisturizer"];
	const DRY_NIACINAMIDE: &[&str] = &[
		"Cleanser",
		"Toner",
		"Niacinamide Serum",
		"Moisturizer",
		"Facial Oil",
	];
	const BARRIER: &[&str] = &["Cleanser", "Toner", "Moisturizer", "Barrier Repair Cream"];

	match skin {
		SkinType::Normal | SkinType::Combination => week(
			&["Cleanser", "Toner", "Vitamin C Serum", "Moisturizer", "Sunscreen"],
			[
				RETINOL,
				EXFOLIATE,
				RETINOL,
				EXFOLIATE,
				RETINOL,
				CLAY,
				&[
					"Cleanser",
					"Toner",
					"Hydrating Mask",
					"Niacinamide Serum",
					"Moisturizer",
				],
			],
		),
		SkinType::Oily => week(
			&[
				"Cleanser",
				"Toner",
				"Niacinamide Serum",
				"Moisturizer (oil-free)",
				"Sunscreen",
			],
			[
				BHA,
				RETINOL,
				BHA,
				RETINOL,
				BHA,
				CLAY,
				&["Cleanser", "Toner", "Niacinamide Serum", "Moisturizer"],
			],
		),
		SkinType::Dry => {
			const HYDRATE: &[&str] = &[
				"Cleanser",
				"Toner",
				"Hydrating Mask",
				"Moisturizer",
				"Facial Oil",
			];
			week(
				&["Cleanser", "Toner", "Vitamin C Serum", "Moisturizer", "Sunscreen"],
				[
					DRY_NIACINAMIDE,
					&["Cleanser", "Toner", "AHA 5%", "Moisturizer", "Facial Oil"],
					DRY_NIACINAMIDE,
					&["Cleanser", "Toner", "Retinol 0.025%", "Moisturizer", "Facial Oil"],
					DRY_NIACINAMIDE,
					HYDRATE,
					HYDRATE,
				],
			)
		}
		SkinType::Sensitive => week(
			&[
				"Cleanser (gentle)",
				"Toner",
				"Niacinamide 5%",
				"Moisturizer",
				"Sunscreen (mineral)",
			],
			[
				BARRIER,
				BARRIER,
				BARRIER,
				&["Cleanser", "Toner", "AHA 5%", "Moisturizer"],
				BARRIER,
				&["Cleanser", "Toner", "Hydrating Mask", "Moisturizer"],
				BARRIER,
			],
		),
	}
}

pub fn weekly_graph(skin: SkinType) -> WeeklyGraph {
	let (chromatic_number, computation_time) = match skin {
		SkinType::Normal => (6, "0.008s"),
		SkinType::Oily => (5, "0.007s"),
		SkinType::Dry => (5, "0.009s"),
		SkinType::Sensitive => (4, "0.006s"),
		SkinType::Combination => (6, "0.010s"),
	};
	build_weekly_graph(
		&schedule(skin),
		color_group,
		&conflicts(),
		chromatic_number,
		computation_time,
	)
}

fn node_name<'a>(graph: &'a GraphData, id: &'a NodeId) -> &'a str {
	graph
		.nodes
		.iter()
		.find(|n| &n.id == id)
		.map_or(id.as_str(), |n| n.name.as_str())
}

/// Overlay text for a hovered edge: both product names, plus the severity
/// and mechanism of a conflict when they are known.
pub fn edge_caption(graph: &GraphData, index: usize) -> Option<String> {
	let edge = graph.edges.get(index)?;
	let pair = format!(
		"{} + {}",
		node_name(graph, &edge.source),
		node_name(graph, &edge.target)
	);
	Some(match &edge.kind {
		EdgeKind::Conflict {
			severity,
			mechanism,
		} => {
			let mut caption = pair;
			if let Some(severity) = (*severity).filter(|s| *s != Severity::Unknown) {
				caption.push_str(&format!(" ({} risk)", severity.as_str()));
			}
			if let Some(mechanism) = mechanism {
				caption.push_str(": ");
				caption.push_str(mechanism);
			}
			caption
		}
		other => format!("{pair}: {}", other.as_str()),
	})
}
