use log::{debug, trace};
use serde::Serialize;

use super::catalog::NodeTemplate;
use super::types::{
	Connection, ConnectionId, ConnectionKind, Node, NodeId, Point, clamp_size,
};

/// Where a node dropped from the library lands relative to the drop point, and how big it
/// starts out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePlacement {
	pub offset: f64,
	pub size: f64,
}

impl Default for NodePlacement {
	fn default() -> Self {
		Self {
			offset: 40.0,
			size: 80.0,
		}
	}
}

/// Nodes and the connections between them for one editing session.
///
/// Every mutation taking an id is a no-op when the id is unknown.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeGraph {
	nodes: Vec<Node>,
	connections: Vec<Connection>,
	#[serde(skip)]
	next_node: u64,
	#[serde(skip)]
	next_connection: u64,
}

impl NodeGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn connections(&self) -> &[Connection] {
		&self.connections
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn find_by_tag(&self, tag: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.tag == tag)
	}

	/// First node, in insertion order, whose square bounds contain `p`.
	pub fn node_at(&self, p: Point) -> Option<&Node> {
		self.nodes.iter().find(|n| n.bounds_contain(p))
	}

	pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
		self.connections.iter().any(|c| c.joins(a, b))
	}

	pub fn neighbours(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		self.connections.iter().filter_map(move |c| c.other_end(id))
	}

	pub fn add_node(
		&mut self,
		template: &NodeTemplate,
		drop_point: Point,
		placement: NodePlacement,
	) -> NodeId {
		let id = NodeId(self.next_node);
		self.next_node += 1;
		self.nodes.push(Node {
			id,
			tag: template.tag.to_owned(),
			name: template.name.to_owned(),
			description: template.description.to_owned(),
			category: template.category,
			body: template.body(),
			position: Point::new(drop_point.x - placement.offset, drop_point.y - placement.offset),
			size: clamp_size(placement.size),
		});
		debug!("added {id} ({}) at {:?}", template.tag, drop_point);
		id
	}

	pub fn move_node(&mut self, id: NodeId, position: Point) {
		if let Some(node) = self.node_mut(id) {
			node.position = position;
		}
	}

	/// Resize relative to the size captured when the gesture began.
	pub fn resize_node(&mut self, id: NodeId, anchor_size: f64, delta: f64) {
		self.set_node_size(id, anchor_size + delta);
	}

	pub fn set_node_size(&mut self, id: NodeId, size: f64) {
		if !size.is_finite() {
			return;
		}
		if let Some(node) = self.node_mut(id) {
			node.size = clamp_size(size);
			trace!("{id} size = {}", node.size);
		}
	}

	pub fn set_node_value(&mut self, id: NodeId, value: &str) {
		match self.node_mut(id) {
			Some(node) => {
				if !node.body.set_value(value) {
					debug!("{id} rejected value {value:?}");
				}
			}
			None => debug!("set value on missing {id}"),
		}
	}

	/// Removes the node and every connection touching it.
	pub fn delete_node(&mut self, id: NodeId) -> Option<Node> {
		let index = self.nodes.iter().position(|n| n.id == id)?;
		let before = self.connections.len();
		self.connections.retain(|c| !c.touches(id));
		debug!("deleted {id} and {} connections", before - self.connections.len());
		Some(self.nodes.remove(index))
	}

	/// Links two distinct existing nodes with a harmony connection. Self links, unknown ids
	/// and pairs that are already linked in either direction are refused.
	pub fn connect(&mut self, from: NodeId, to: NodeId) -> Option<ConnectionId> {
		if from == to {
			debug!("refused self connection on {from}");
			return None;
		}
		if self.node(from).is_none() || self.node(to).is_none() {
			debug!("refused connection {from} -> {to}: unknown node");
			return None;
		}
		if self.are_connected(from, to) {
			debug!("refused connection {from} -> {to}: already linked");
			return None;
		}
		let id = ConnectionId(self.next_connection);
		self.next_connection += 1;
		self.connections.push(Connection {
			id,
			from,
			to,
			kind: ConnectionKind::Harmony,
		});
		debug!("connected {from} -> {to} as {id}");
		Some(id)
	}

	pub fn toggle_connection_kind(&mut self, id: ConnectionId) {
		match self.connections.iter_mut().find(|c| c.id == id) {
			Some(c) => c.kind = c.kind.toggled(),
			None => debug!("toggle on missing {id}"),
		}
	}
}
