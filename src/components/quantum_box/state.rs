//! Editor state and the actions that change it.
//!
//! All session state lives in one [`EditorState`] owned by the page. UI handlers never
//! touch its parts directly; they describe what happened as an [`EditorAction`] and
//! [`EditorState::dispatch`] applies it.

use log::{debug, warn};

use super::catalog;
use super::config::EditorConfig;
use super::generation::GenerationOutcome;
use super::graph::{NodeGraph, NodePlacement};
use super::interaction::{InteractionController, PointerTarget, hit_target};
use super::types::{Node, NodeId, OutputFormat, Point};
use super::weights::WeightStore;

pub const MAX_LEVEL: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
	/// 0 leans on tension, 100 on harmony.
	pub harmony_level: u8,
	pub style_rigidity: u8,
	pub redistribution_enabled: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			harmony_level: 50,
			style_rigidity: 50,
			redistribution_enabled: false,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SidebarTab {
	#[default]
	Inspector,
	Weights,
}

/// The last generation result and the format it was requested in.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedOutput {
	pub format: OutputFormat,
	pub outcome: GenerationOutcome,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorAction {
	DropTemplate { tag: String, at: Point },
	PreviewTemplate(&'static str),
	PointerDown(Point),
	PointerMove(Point),
	PointerUp(Point),
	CancelGesture,
	SetNodeValue { node: NodeId, value: String },
	SetNodeSize { node: NodeId, size: f64 },
	DeleteNode(NodeId),
	SetWeight { tag: String, weight: f64 },
	SetRedistribution(bool),
	SetStyleRigidity(i64),
	SetHarmonyLevel(i64),
	ShowTab(SidebarTab),
	GenerationStarted,
	GenerationFinished(GeneratedOutput),
	ShowOutput(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
	pub graph: NodeGraph,
	pub weights: WeightStore,
	pub controller: InteractionController,
	pub settings: Settings,
	pub placement: NodePlacement,
	pub preview: Option<&'static str>,
	pub tab: SidebarTab,
	pub generating: bool,
	pub output: Option<GeneratedOutput>,
	pub output_visible: bool,
}

impl Default for EditorState {
	fn default() -> Self {
		Self::new(&EditorConfig::default())
	}
}

fn level(value: i64) -> u8 {
	u8::try_from(value.clamp(0, i64::from(MAX_LEVEL))).unwrap_or(MAX_LEVEL)
}

impl EditorState {
	pub fn new(config: &EditorConfig) -> Self {
		Self {
			graph: NodeGraph::new(),
			weights: WeightStore::from_catalog(),
			controller: InteractionController::new(),
			settings: Settings {
				harmony_level: config.harmony_level.min(MAX_LEVEL),
				style_rigidity: config.style_rigidity.min(MAX_LEVEL),
				redistribution_enabled: config.redistribution_enabled,
			},
			placement: config.placement(),
			preview: None,
			tab: SidebarTab::default(),
			generating: false,
			output: None,
			output_visible: false,
		}
	}

	pub fn selected(&self) -> Option<&Node> {
		self.controller.selection().and_then(|id| self.graph.node(id))
	}

	/// Applies `action`. Returns whether a pointer gesture is in progress afterwards, which
	/// is when the page should be listening on the window.
	pub fn dispatch(&mut self, action: EditorAction) -> bool {
		match action {
			EditorAction::DropTemplate { tag, at } => match catalog::template_for(&tag) {
				Some(template) => {
					self.graph.add_node(template, at, self.placement);
				}
				None => warn!("dropped unknown tag {tag:?}"),
			},
			EditorAction::PreviewTemplate(tag) => {
				self.preview = Some(tag);
				self.controller.clear_selection();
				self.tab = SidebarTab::Inspector;
			}
			EditorAction::PointerDown(at) => {
				if self.controller.is_active() {
					return true;
				}
				let target = hit_target(&self.graph, at);
				let started = self.controller.pointer_down(&mut self.graph, target, at);
				match target {
					PointerTarget::Body(_) => {
						self.preview = None;
						self.tab = SidebarTab::Inspector;
					}
					PointerTarget::Canvas => self.preview = None,
					_ => {}
				}
				return started;
			}
			EditorAction::PointerMove(at) => self.controller.pointer_move(&mut self.graph, at),
			EditorAction::PointerUp(at) => {
				self.controller.pointer_up(&mut self.graph, at);
			}
			EditorAction::CancelGesture => {
				self.controller.cancel();
			}
			EditorAction::SetNodeValue { node, value } => self.graph.set_node_value(node, &value),
			EditorAction::SetNodeSize { node, size } => self.graph.set_node_size(node, size),
			EditorAction::DeleteNode(node) => {
				if self.graph.delete_node(node).is_some() {
					self.controller.forget(node);
				}
			}
			EditorAction::SetWeight { tag, weight } => {
				self.weights
					.set_weight(&tag, weight, self.settings.redistribution_enabled);
			}
			EditorAction::SetRedistribution(enabled) => {
				self.settings.redistribution_enabled = enabled;
			}
			EditorAction::SetStyleRigidity(value) => self.settings.style_rigidity = level(value),
			EditorAction::SetHarmonyLevel(value) => self.settings.harmony_level = level(value),
			EditorAction::ShowTab(tab) => self.tab = tab,
			EditorAction::GenerationStarted => {
				self.generating = true;
				self.output = None;
				self.output_visible = false;
			}
			EditorAction::GenerationFinished(output) => {
				debug!("generation outcome stored for {}", output.format.as_str());
				self.generating = false;
				self.output = Some(output);
			}
			EditorAction::ShowOutput(visible) => {
				self.output_visible =
					visible && self.output.is_some() && !self.generating;
			}
		}
		self.controller.is_active()
	}

	/// Format the output node asks for, `image` when there is none.
	pub fn requested_format(&self) -> OutputFormat {
		self.graph
			.find_by_tag(catalog::OUTPUT_TAG)
			.and_then(|n| OutputFormat::parse(n.value()))
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::quantum_box::generation::{GenerationError, Precondition};
	use crate::components::quantum_box::types::ConnectionKind;

	fn place(state: &mut EditorState, tag: &str, x: f64, y: f64) -> NodeId {
		state.dispatch(EditorAction::DropTemplate {
			tag: tag.into(),
			at: Point::new(x, y),
		});
		state.graph.nodes().last().unwrap().id
	}

	#[test]
	fn dropping_unknown_tags_adds_nothing() {
		let mut state = EditorState::default();
		state.dispatch(EditorAction::DropTemplate {
			tag: "nope".into(),
			at: Point::new(0.0, 0.0),
		});
		assert!(state.graph.is_empty());
	}

	#[test]
	fn gesture_flag_follows_pointer_down_and_up() {
		let mut state = EditorState::default();
		let a = place(&mut state, "theme", 100.0, 100.0);
		state.dispatch(EditorAction::PreviewTemplate("genre"));
		assert!(state.dispatch(EditorAction::PointerDown(Point::new(100.0, 100.0))));
		assert_eq!(state.preview, None);
		assert_eq!(state.selected().map(|n| n.id), Some(a));
		assert!(state.dispatch(EditorAction::PointerMove(Point::new(150.0, 100.0))));
		assert!(!state.dispatch(EditorAction::PointerUp(Point::new(150.0, 100.0))));
		assert_eq!(state.graph.node(a).unwrap().position, Point::new(110.0, 60.0));
	}

	#[test]
	fn connect_through_dispatch_then_toggle_and_cascade() {
		let mut state = EditorState::default();
		let a = place(&mut state, "theme", 100.0, 100.0);
		let b = place(&mut state, "tone", 400.0, 100.0);
		// right connector of a sits at (140, 100)
		assert!(state.dispatch(EditorAction::PointerDown(Point::new(140.0, 100.0))));
		assert!(state.dispatch(EditorAction::PointerMove(Point::new(300.0, 120.0))));
		assert!(state.controller.pending_line().is_some());
		assert!(!state.dispatch(EditorAction::PointerUp(Point::new(400.0, 100.0))));
		let link = state.graph.connections()[0].clone();
		assert_eq!((link.from, link.to), (a, b));

		// badge sits midway between the centres
		assert!(!state.dispatch(EditorAction::PointerDown(Point::new(250.0, 100.0))));
		assert_eq!(state.graph.connections()[0].kind, ConnectionKind::Tension);

		state.dispatch(EditorAction::PointerDown(Point::new(100.0, 100.0)));
		state.dispatch(EditorAction::PointerUp(Point::new(100.0, 100.0)));
		state.dispatch(EditorAction::DeleteNode(a));
		assert!(state.graph.connections().is_empty());
		assert_eq!(state.selected(), None);
	}

	#[test]
	fn canvas_press_clears_selection_and_preview() {
		let mut state = EditorState::default();
		place(&mut state, "theme", 100.0, 100.0);
		state.dispatch(EditorAction::PointerDown(Point::new(100.0, 100.0)));
		state.dispatch(EditorAction::PointerUp(Point::new(100.0, 100.0)));
		state.dispatch(EditorAction::PreviewTemplate("genre"));
		assert_eq!(state.preview, Some("genre"));
		assert!(!state.dispatch(EditorAction::PointerDown(Point::new(900.0, 900.0))));
		assert_eq!(state.preview, None);
		assert_eq!(state.selected(), None);
	}

	#[test]
	fn cancel_ends_the_gesture() {
		let mut state = EditorState::default();
		place(&mut state, "theme", 100.0, 100.0);
		assert!(state.dispatch(EditorAction::PointerDown(Point::new(140.0, 100.0))));
		assert!(!state.dispatch(EditorAction::CancelGesture));
		assert!(state.controller.pending_line().is_none());
	}

	#[test]
	fn weights_follow_the_redistribution_switch() {
		let mut state = EditorState::default();
		state.dispatch(EditorAction::SetWeight {
			tag: "shotType".into(),
			weight: 1.4,
		});
		assert!((state.weights.get_weight("lighting") - 1.0).abs() < 1e-9);
		state.dispatch(EditorAction::SetRedistribution(true));
		state.dispatch(EditorAction::SetWeight {
			tag: "shotType".into(),
			weight: 1.8,
		});
		assert!((state.weights.get_weight("lighting") - 0.8).abs() < 1e-9);
		assert!((state.weights.get_weight("cameraAngle") - 0.8).abs() < 1e-9);
	}

	#[test]
	fn levels_are_clamped() {
		let mut state = EditorState::default();
		state.dispatch(EditorAction::SetHarmonyLevel(250));
		state.dispatch(EditorAction::SetStyleRigidity(-4));
		assert_eq!(state.settings.harmony_level, 100);
		assert_eq!(state.settings.style_rigidity, 0);
	}

	#[test]
	fn output_modal_only_opens_with_a_finished_result() {
		let mut state = EditorState::default();
		state.dispatch(EditorAction::ShowOutput(true));
		assert!(!state.output_visible);
		state.dispatch(EditorAction::GenerationStarted);
		assert!(state.generating);
		state.dispatch(EditorAction::GenerationFinished(GeneratedOutput {
			format: OutputFormat::Image,
			outcome: GenerationOutcome::Failed(GenerationError::TimedOut(10)),
		}));
		state.dispatch(EditorAction::ShowOutput(true));
		assert!(state.output_visible);
		state.dispatch(EditorAction::GenerationStarted);
		assert!(!state.output_visible);
		assert!(state.output.is_none());
		state.dispatch(EditorAction::GenerationFinished(GeneratedOutput {
			format: OutputFormat::Image,
			outcome: GenerationOutcome::Rejected(Precondition::MissingOutputNode),
		}));
		assert!(!state.generating);
	}

	#[test]
	fn requested_format_reads_the_output_node() {
		let mut state = EditorState::default();
		assert_eq!(state.requested_format(), OutputFormat::Image);
		let out = place(&mut state, catalog::OUTPUT_TAG, 400.0, 300.0);
		state.dispatch(EditorAction::SetNodeValue {
			node: out,
			value: "video".into(),
		});
		assert_eq!(state.requested_format(), OutputFormat::Video);
	}
}
