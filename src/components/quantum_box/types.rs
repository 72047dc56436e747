use std::fmt;
use std::ops::{Add, Sub};

use serde::Serialize;

use super::catalog::Category;

pub const MIN_NODE_SIZE: f64 = 50.0;
pub const MAX_NODE_SIZE: f64 = 200.0;

pub fn clamp_size(size: f64) -> f64 {
	size.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

/// Canvas coordinates, origin at the top-left of the editor surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node-{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "conn-{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
	#[default]
	Harmony,
	Tension,
}

impl ConnectionKind {
	pub fn toggled(self) -> Self {
		match self {
			Self::Harmony => Self::Tension,
			Self::Tension => Self::Harmony,
		}
	}

	pub fn badge(self) -> &'static str {
		match self {
			Self::Harmony => "H",
			Self::Tension => "T",
		}
	}
}

/// Undirected relation between two distinct nodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connection {
	pub id: ConnectionId,
	pub from: NodeId,
	pub to: NodeId,
	pub kind: ConnectionKind,
}

impl Connection {
	pub fn touches(&self, node: NodeId) -> bool {
		self.from == node || self.to == node
	}

	/// True when this connection links `a` and `b` in either direction.
	pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
		(self.from == a && self.to == b) || (self.from == b && self.to == a)
	}

	pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
		if self.from == node {
			Some(self.to)
		} else if self.to == node {
			Some(self.from)
		} else {
			None
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	#[default]
	Image,
	Video,
	Story,
	Batch,
}

impl OutputFormat {
	pub const ALL: [OutputFormat; 4] = [Self::Image, Self::Video, Self::Story, Self::Batch];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Image => "image",
			Self::Video => "video",
			Self::Story => "story",
			Self::Batch => "batch",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Image => "Image prompt",
			Self::Video => "Video prompt",
			Self::Story => "Story outline",
			Self::Batch => "Batch image prompts",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|f| f.as_str() == value)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeOption {
	pub value: String,
	pub label: String,
}

/// Kind-specific payload of a node. Each variant carries only what that kind can hold.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeBody {
	Input { value: String },
	Text { value: String },
	Option { options: Vec<NodeOption>, value: String },
	Output { format: OutputFormat },
}

impl NodeBody {
	pub fn value(&self) -> &str {
		match self {
			Self::Input { value } | Self::Text { value } | Self::Option { value, .. } => value.as_str(),
			Self::Output { format } => format.as_str(),
		}
	}

	/// Writes `value` if the kind accepts it. Option nodes take the empty string or one of
	/// their option values; output nodes take a known format name.
	pub fn set_value(&mut self, new_value: &str) -> bool {
		match self {
			Self::Input { value } | Self::Text { value } => {
				new_value.clone_into(value);
				true
			}
			Self::Option { options, value } => {
				if new_value.is_empty() || options.iter().any(|o| o.value == new_value) {
					new_value.clone_into(value);
					true
				} else {
					false
				}
			}
			Self::Output { format } => match OutputFormat::parse(new_value) {
				Some(parsed) => {
					*format = parsed;
					true
				}
				None => false,
			},
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
	pub id: NodeId,
	pub tag: String,
	pub name: String,
	pub description: String,
	pub category: Category,
	pub body: NodeBody,
	pub position: Point,
	pub size: f64,
}

impl Node {
	pub fn value(&self) -> &str {
		self.body.value()
	}

	pub fn centre(&self) -> Point {
		let half = self.size / 2.0;
		Point::new(self.position.x + half, self.position.y + half)
	}

	/// Square bounding-box test, used for drop targets of a connect gesture.
	pub fn bounds_contain(&self, p: Point) -> bool {
		p.x >= self.position.x
			&& p.x <= self.position.x + self.size
			&& p.y >= self.position.y
			&& p.y <= self.position.y + self.size
	}

	/// Circular test against the drawn disc.
	pub fn disc_contains(&self, p: Point) -> bool {
		self.centre().distance(p) <= self.size / 2.0
	}
}
