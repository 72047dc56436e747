use serde::Serialize;

use super::catalog::OUTPUT_TAG;
use super::graph::NodeGraph;
use super::types::{NodeId, Point};

/// One populated node as the generator sees it: closer to the sun means more central,
/// bigger means more important.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpatialEntry {
	pub id: NodeId,
	pub name: String,
	pub value: String,
	pub size: f64,
	pub distance: f64,
}

/// Every node with a value, except the output node, in graph order.
pub fn spatial_context(graph: &NodeGraph, centre: Point) -> Vec<SpatialEntry> {
	graph
		.nodes()
		.iter()
		.filter(|n| !n.value().is_empty() && n.tag != OUTPUT_TAG)
		.map(|n| SpatialEntry {
			id: n.id,
			name: n.name.clone(),
			value: n.value().to_owned(),
			size: n.size,
			distance: n.centre().distance(centre),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;

	use super::*;
	use crate::components::quantum_box::catalog::template_for;
	use crate::components::quantum_box::graph::NodePlacement;

	fn place(graph: &mut NodeGraph, tag: &str, x: f64, y: f64) -> NodeId {
		graph.add_node(template_for(tag).unwrap(), Point::new(x, y), NodePlacement::default())
	}

	#[test]
	fn empty_values_and_output_node_are_skipped() {
		let mut graph = NodeGraph::new();
		place(&mut graph, "theme", 0.0, 0.0);
		place(&mut graph, OUTPUT_TAG, 0.0, 0.0);
		assert!(spatial_context(&graph, Point::new(400.0, 300.0)).is_empty());
	}

	#[test]
	fn distance_is_measured_from_node_centre_in_graph_order() {
		let mut graph = NodeGraph::new();
		let far = place(&mut graph, "theme", 700.0, 300.0);
		let near = place(&mut graph, "genre", 430.0, 340.0);
		graph.set_node_value(far, "loss");
		graph.resize_node(far, 80.0, 40.0);
		let entries = spatial_context(&graph, Point::new(400.0, 300.0));
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].id, far);
		assert_eq!(entries[0].value, "loss");
		assert_relative_eq!(entries[0].size, 120.0);
		// top-left (660, 260), centre (720, 320)
		assert_relative_eq!(entries[0].distance, 320.0_f64.hypot(20.0), epsilon = 1e-9);
		assert_eq!(entries[1].id, near);
		assert_relative_eq!(entries[1].distance, 50.0);
	}
}
