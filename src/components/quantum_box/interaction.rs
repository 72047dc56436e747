//! Pointer gesture state machine for the canvas.
//!
//! A gesture runs from pointer-down to pointer-up. Only one can be active; the controller
//! reports when one starts and ends so the component can hold its window listeners for
//! exactly that long.

use log::{debug, trace};

use super::graph::NodeGraph;
use super::types::{ConnectionId, Node, NodeId, Point};

pub const CONNECTOR_RADIUS: f64 = 8.0;
pub const HANDLE_RADIUS: f64 = 10.0;
/// Inset of the resize handle centre from the bottom-right corner of the node bounds.
pub const HANDLE_INSET: f64 = 6.0;
pub const BADGE_SIZE: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorSide {
	Left,
	Right,
}

/// What a pointer-down landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
	Body(NodeId),
	ResizeHandle(NodeId),
	Connector(NodeId, ConnectorSide),
	Badge(ConnectionId),
	Canvas,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Moving {
		node: NodeId,
		grab_offset: Point,
	},
	Resizing {
		node: NodeId,
		anchor_size: f64,
		anchor_x: f64,
	},
	Connecting {
		from: NodeId,
		origin: Point,
		pointer: Point,
	},
}

pub fn connector_position(node: &Node, side: ConnectorSide) -> Point {
	let mid_y = node.position.y + node.size / 2.0;
	match side {
		ConnectorSide::Left => Point::new(node.position.x, mid_y),
		ConnectorSide::Right => Point::new(node.position.x + node.size, mid_y),
	}
}

pub fn handle_position(node: &Node) -> Point {
	Point::new(
		node.position.x + node.size - HANDLE_INSET,
		node.position.y + node.size - HANDLE_INSET,
	)
}

/// Midpoint between the centres of the two endpoints, where the kind badge is drawn.
pub fn badge_position(graph: &NodeGraph, from: NodeId, to: NodeId) -> Option<Point> {
	let (a, b) = (graph.node(from)?, graph.node(to)?);
	Some(a.centre().midpoint(b.centre()))
}

/// Resolves a pointer-down position. Nodes are tested topmost first (last drawn), and on
/// each node connectors beat the resize handle, which beats the disc. Connection badges
/// sit under the nodes.
pub fn hit_target(graph: &NodeGraph, p: Point) -> PointerTarget {
	for node in graph.nodes().iter().rev() {
		for side in [ConnectorSide::Left, ConnectorSide::Right] {
			if connector_position(node, side).distance(p) <= CONNECTOR_RADIUS {
				return PointerTarget::Connector(node.id, side);
			}
		}
		if handle_position(node).distance(p) <= HANDLE_RADIUS {
			return PointerTarget::ResizeHandle(node.id);
		}
		if node.disc_contains(p) {
			return PointerTarget::Body(node.id);
		}
	}
	let half = BADGE_SIZE / 2.0;
	graph
		.connections()
		.iter()
		.rev()
		.find(|c| {
			badge_position(graph, c.from, c.to)
				.is_some_and(|m| (p.x - m.x).abs() <= half && (p.y - m.y).abs() <= half)
		})
		.map_or(PointerTarget::Canvas, |c| PointerTarget::Badge(c.id))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionController {
	gesture: Gesture,
	selection: Option<NodeId>,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn gesture(&self) -> Gesture {
		self.gesture
	}

	pub fn is_active(&self) -> bool {
		self.gesture != Gesture::Idle
	}

	pub fn selection(&self) -> Option<NodeId> {
		self.selection
	}

	pub fn clear_selection(&mut self) {
		self.selection = None;
	}

	/// Drops the selection if it points at `node`.
	pub fn forget(&mut self, node: NodeId) {
		if self.selection == Some(node) {
			self.selection = None;
		}
		let involved = match self.gesture {
			Gesture::Moving { node: n, .. }
			| Gesture::Resizing { node: n, .. }
			| Gesture::Connecting { from: n, .. } => n == node,
			Gesture::Idle => false,
		};
		if involved {
			self.gesture = Gesture::Idle;
		}
	}

	/// In-progress connection line, origin to pointer.
	pub fn pending_line(&self) -> Option<(Point, Point)> {
		match self.gesture {
			Gesture::Connecting { origin, pointer, .. } => Some((origin, pointer)),
			_ => None,
		}
	}

	/// Starts a gesture for `target`. Returns true when a gesture is now in progress and
	/// window listeners are needed. Ignored while another gesture is running.
	pub fn pointer_down(&mut self, graph: &mut NodeGraph, target: PointerTarget, p: Point) -> bool {
		if self.is_active() {
			trace!("pointer down during {:?} ignored", self.gesture);
			return true;
		}
		self.gesture = match target {
			PointerTarget::Body(id) => match graph.node(id) {
				Some(node) => {
					self.selection = Some(id);
					Gesture::Moving {
						node: id,
						grab_offset: p - node.position,
					}
				}
				None => Gesture::Idle,
			},
			PointerTarget::ResizeHandle(id) => match graph.node(id) {
				Some(node) => Gesture::Resizing {
					node: id,
					anchor_size: node.size,
					anchor_x: p.x,
				},
				None => Gesture::Idle,
			},
			PointerTarget::Connector(id, _) => match graph.node(id) {
				Some(node) => Gesture::Connecting {
					from: id,
					origin: node.centre(),
					pointer: p,
				},
				None => Gesture::Idle,
			},
			PointerTarget::Badge(id) => {
				graph.toggle_connection_kind(id);
				Gesture::Idle
			}
			PointerTarget::Canvas => {
				self.selection = None;
				Gesture::Idle
			}
		};
		debug!("pointer down on {target:?} -> {:?}", self.gesture);
		self.is_active()
	}

	pub fn pointer_move(&mut self, graph: &mut NodeGraph, p: Point) {
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::Moving { node, grab_offset } => graph.move_node(*node, p - *grab_offset),
			Gesture::Resizing {
				node,
				anchor_size,
				anchor_x,
			} => graph.resize_node(*node, *anchor_size, p.x - *anchor_x),
			Gesture::Connecting { pointer, .. } => *pointer = p,
		}
	}

	/// Ends the gesture. A connect gesture released over another node's bounds links the
	/// two; released anywhere else it is dropped.
	pub fn pointer_up(&mut self, graph: &mut NodeGraph, p: Point) -> Option<ConnectionId> {
		let gesture = std::mem::take(&mut self.gesture);
		let Gesture::Connecting { from, .. } = gesture else {
			return None;
		};
		let target = graph.node_at(p).map(|n| n.id).filter(|id| *id != from)?;
		graph.connect(from, target)
	}

	/// Ends the gesture without completing it. Moves and resizes already applied stay.
	pub fn cancel(&mut self) -> bool {
		let was_active = self.is_active();
		if was_active {
			debug!("cancelled {:?}", self.gesture);
		}
		self.gesture = Gesture::Idle;
		was_active
	}
}
