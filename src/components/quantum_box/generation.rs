//! Boundary to the text generator.
//!
//! `prepare` checks the graph before anything leaves the editor; `run` hands a prepared
//! request to a [`Generator`] under a timeout. Every path ends in a [`GenerationOutcome`]
//! that can be shown to the user as text.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{self, Either, LocalBoxFuture};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen_futures::JsFuture;

use super::catalog::{MASTER_TAG, OUTPUT_TAG, VARIANT_TAG};
use super::graph::NodeGraph;
use super::spatial::{SpatialEntry, spatial_context};
use super::state::Settings;
use super::types::{NodeBody, OutputFormat, Point};
use super::weights::WeightStore;

/// Checks that fail before the generator is called. Shown to the user in place of output.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Precondition {
	#[error("Error: Add an 'AI Prompt Output' node to your graph.")]
	MissingOutputNode,
	#[error("Error: Add some planets with values to generate a prompt.")]
	NoPopulatedNodes,
	#[error("Error: Batch mode needs a 'Master Shot' planet connected to at least one 'Shot Variant'.")]
	MissingBatchMaster,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
	#[error("Generation failed: {0}")]
	Backend(String),
	#[error("Generation timed out after {0} ms.")]
	TimedOut(u32),
}

/// Everything the generator receives for one run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
	pub graph: NodeGraph,
	pub context: Vec<SpatialEntry>,
	pub harmony_level: u8,
	pub weights: BTreeMap<String, f64>,
	pub style_rigidity: u8,
	pub output_kind: OutputFormat,
}

impl GenerationRequest {
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

#[async_trait(?Send)]
pub trait Generator {
	async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Stand-in used until a real backend is wired up.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderGenerator;

#[async_trait(?Send)]
impl Generator for PlaceholderGenerator {
	async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
		warn!(
			"generation service not configured; {} context entries for {} output dropped",
			request.context.len(),
			request.output_kind.as_str()
		);
		Ok("AI service is not yet configured. Please add your API key to enable full functionality.".to_owned())
	}
}

pub trait Timer {
	fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// `setTimeout` through a JS promise.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
	fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
		let delay = i32::try_from(ms).unwrap_or(i32::MAX);
		let promise = js_sys::Promise::new(&mut |resolve, _reject| {
			let Some(window) = web_sys::window() else {
				warn!("no window; generation timeout disabled");
				return;
			};
			if let Err(e) =
				window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
			{
				warn!("setTimeout failed: {e:?}");
			}
		});
		async move {
			let _ = JsFuture::from(promise).await;
		}
		.boxed_local()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenerationOutcome {
	Completed(String),
	Rejected(Precondition),
	Failed(GenerationError),
}

impl GenerationOutcome {
	pub fn display_text(&self) -> String {
		match self {
			Self::Completed(text) => text.clone(),
			Self::Rejected(p) => p.to_string(),
			Self::Failed(e) => e.to_string(),
		}
	}
}

/// Validates the graph and builds the request.
pub fn prepare(
	graph: &NodeGraph,
	weights: &WeightStore,
	settings: &Settings,
	centre: Point,
) -> Result<GenerationRequest, Precondition> {
	let output = graph
		.find_by_tag(OUTPUT_TAG)
		.ok_or(Precondition::MissingOutputNode)?;
	let output_kind = match &output.body {
		NodeBody::Output { format } => *format,
		other => OutputFormat::parse(other.value()).unwrap_or_default(),
	};

	let context = spatial_context(graph, centre);
	if context.is_empty() && output_kind != OutputFormat::Batch {
		return Err(Precondition::NoPopulatedNodes);
	}
	if output_kind == OutputFormat::Batch && !has_connected_master(graph) {
		return Err(Precondition::MissingBatchMaster);
	}

	Ok(GenerationRequest {
		graph: graph.clone(),
		context,
		harmony_level: settings.harmony_level,
		weights: weights.snapshot(),
		style_rigidity: settings.style_rigidity,
		output_kind,
	})
}

fn has_connected_master(graph: &NodeGraph) -> bool {
	graph
		.nodes()
		.iter()
		.filter(|n| n.tag == MASTER_TAG)
		.any(|master| {
			graph
				.neighbours(master.id)
				.filter_map(|id| graph.node(id))
				.any(|n| n.tag == VARIANT_TAG)
		})
}

/// Calls the generator unless preparation failed, racing it against `timeout_ms`.
pub async fn run<G, T>(
	prepared: Result<GenerationRequest, Precondition>,
	generator: &G,
	timer: &T,
	timeout_ms: u32,
) -> GenerationOutcome
where
	G: Generator + ?Sized,
	T: Timer + ?Sized,
{
	let request = match prepared {
		Ok(request) => request,
		Err(p) => {
			warn!("generation rejected: {p}");
			return GenerationOutcome::Rejected(p);
		}
	};
	info!(
		"generating {} from {} nodes",
		request.output_kind.as_str(),
		request.context.len()
	);
	if let Ok(payload) = request.to_json() {
		debug!("generation payload is {} bytes", payload.len());
	}

	let call = generator.generate(&request);
	let deadline = timer.sleep(timeout_ms);
	let result = match future::select(call, deadline).await {
		Either::Left((result, _)) => result,
		Either::Right(((), _)) => Err(GenerationError::TimedOut(timeout_ms)),
	};
	match result {
		Ok(text) => {
			info!("generation finished, {} chars", text.len());
			GenerationOutcome::Completed(text)
		}
		Err(e) => {
			warn!("{e}");
			GenerationOutcome::Failed(e)
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BatchPrompt {
	pub prompt: String,
	#[serde(default)]
	pub explanation: String,
}

/// How a completed result should be shown.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputView {
	Text(String),
	Prompts(Vec<BatchPrompt>),
}

impl OutputView {
	/// Batch results that parse as a JSON list of prompts become prompt cards; anything
	/// else is plain text.
	pub fn parse(kind: OutputFormat, text: &str) -> Self {
		if kind == OutputFormat::Batch {
			if let Ok(prompts) = serde_json::from_str::<Vec<BatchPrompt>>(text) {
				return Self::Prompts(prompts);
			}
		}
		Self::Text(text.to_owned())
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use futures::executor::block_on;

	use super::*;
	use crate::components::quantum_box::catalog::template_for;
	use crate::components::quantum_box::graph::NodePlacement;
	use crate::components::quantum_box::types::NodeId;

	const CENTRE: Point = Point::new(400.0, 300.0);

	struct Counting {
		calls: Cell<usize>,
		reply: Result<String, GenerationError>,
	}

	impl Counting {
		fn replying(reply: Result<String, GenerationError>) -> Self {
			Self {
				calls: Cell::new(0),
				reply,
			}
		}
	}

	#[async_trait(?Send)]
	impl Generator for Counting {
		async fn generate(&self, _: &GenerationRequest) -> Result<String, GenerationError> {
			self.calls.set(self.calls.get() + 1);
			self.reply.clone()
		}
	}

	struct Stalled;

	#[async_trait(?Send)]
	impl Generator for Stalled {
		async fn generate(&self, _: &GenerationRequest) -> Result<String, GenerationError> {
			future::pending().await
		}
	}

	struct Instant;

	impl Timer for Instant {
		fn sleep(&self, _: u32) -> LocalBoxFuture<'static, ()> {
			future::ready(()).boxed_local()
		}
	}

	struct Never;

	impl Timer for Never {
		fn sleep(&self, _: u32) -> LocalBoxFuture<'static, ()> {
			future::pending().boxed_local()
		}
	}

	fn place(graph: &mut NodeGraph, tag: &str, x: f64, y: f64) -> NodeId {
		graph.add_node(template_for(tag).unwrap(), Point::new(x, y), NodePlacement::default())
	}

	fn prepare_default(graph: &NodeGraph) -> Result<GenerationRequest, Precondition> {
		prepare(graph, &WeightStore::from_catalog(), &Settings::default(), CENTRE)
	}

	#[test]
	fn output_node_is_required() {
		let mut graph = NodeGraph::new();
		let theme = place(&mut graph, "theme", 100.0, 100.0);
		graph.set_node_value(theme, "grief");
		assert_eq!(prepare_default(&graph), Err(Precondition::MissingOutputNode));
	}

	#[test]
	fn empty_graph_values_are_rejected_without_calling_the_generator() {
		let mut graph = NodeGraph::new();
		place(&mut graph, OUTPUT_TAG, 400.0, 300.0);
		place(&mut graph, "theme", 100.0, 100.0);
		let generator = Counting::replying(Ok("unused".into()));
		let outcome = block_on(run(prepare_default(&graph), &generator, &Never, 1000));
		assert_eq!(outcome, GenerationOutcome::Rejected(Precondition::NoPopulatedNodes));
		assert_eq!(
			outcome.display_text(),
			"Error: Add some planets with values to generate a prompt."
		);
		assert_eq!(generator.calls.get(), 0);
	}

	#[test]
	fn request_carries_context_weights_and_settings() {
		let mut graph = NodeGraph::new();
		let out = place(&mut graph, OUTPUT_TAG, 400.0, 300.0);
		graph.set_node_value(out, "story");
		place(&mut graph, "genre", 400.0, 300.0);
		let mut weights = WeightStore::from_catalog();
		weights.set_weight("genre", 1.5, false);
		let settings = Settings {
			harmony_level: 80,
			style_rigidity: 20,
			..Settings::default()
		};
		let request = prepare(&graph, &weights, &settings, CENTRE).unwrap();
		assert_eq!(request.output_kind, OutputFormat::Story);
		assert_eq!(request.context.len(), 1);
		assert_eq!(request.context[0].value, "drama");
		assert_eq!(request.weights.get("genre"), Some(&1.5));
		assert_eq!((request.harmony_level, request.style_rigidity), (80, 20));
		let json = request.to_json().unwrap();
		assert!(json.contains("\"outputKind\":\"story\""));
		assert!(json.contains("\"harmonyLevel\":80"));
	}

	#[test]
	fn batch_needs_a_master_connected_to_a_variant() {
		let mut graph = NodeGraph::new();
		let out = place(&mut graph, OUTPUT_TAG, 400.0, 300.0);
		graph.set_node_value(out, "batch");
		let master = place(&mut graph, MASTER_TAG, 100.0, 100.0);
		let variant = place(&mut graph, VARIANT_TAG, 600.0, 100.0);
		assert_eq!(prepare_default(&graph), Err(Precondition::MissingBatchMaster));

		graph.connect(variant, master);
		let request = prepare_default(&graph).expect("batch allowed with no populated values");
		assert_eq!(request.output_kind, OutputFormat::Batch);
		assert!(request.context.is_empty());
	}

	#[test]
	fn completed_and_failed_calls_become_outcomes() {
		let mut graph = NodeGraph::new();
		place(&mut graph, OUTPUT_TAG, 400.0, 300.0);
		let genre = place(&mut graph, "genre", 100.0, 100.0);
		graph.set_node_value(genre, "horror");

		let ok = Counting::replying(Ok("a foggy pier".into()));
		let outcome = block_on(run(prepare_default(&graph), &ok, &Never, 1000));
		assert_eq!(outcome, GenerationOutcome::Completed("a foggy pier".into()));
		assert_eq!(ok.calls.get(), 1);

		let failing = Counting::replying(Err(GenerationError::Backend("quota exceeded".into())));
		let outcome = block_on(run(prepare_default(&graph), &failing, &Never, 1000));
		assert_eq!(outcome.display_text(), "Generation failed: quota exceeded");
	}

	#[test]
	fn stalled_generator_times_out() {
		let mut graph = NodeGraph::new();
		place(&mut graph, OUTPUT_TAG, 400.0, 300.0);
		let genre = place(&mut graph, "genre", 100.0, 100.0);
		graph.set_node_value(genre, "horror");
		let outcome = block_on(run(prepare_default(&graph), &Stalled, &Instant, 250));
		assert_eq!(outcome, GenerationOutcome::Failed(GenerationError::TimedOut(250)));
	}

	#[test]
	fn placeholder_answers_with_a_notice() {
		let mut graph = NodeGraph::new();
		place(&mut graph, OUTPUT_TAG, 400.0, 300.0);
		let genre = place(&mut graph, "genre", 100.0, 100.0);
		graph.set_node_value(genre, "horror");
		let outcome = block_on(run(prepare_default(&graph), &PlaceholderGenerator, &Never, 1000));
		assert!(matches!(outcome, GenerationOutcome::Completed(text) if text.contains("not yet configured")));
	}

	#[test]
	fn batch_output_parses_prompt_lists_and_falls_back_to_text() {
		let json = r#"[{"prompt":"pier at dawn","explanation":"sets the mood"},{"prompt":"pier at dusk"}]"#;
		match OutputView::parse(OutputFormat::Batch, json) {
			OutputView::Prompts(prompts) => {
				assert_eq!(prompts.len(), 2);
				assert_eq!(prompts[1].explanation, "");
			}
			other => panic!("expected prompts, got {other:?}"),
		}
		assert_eq!(
			OutputView::parse(OutputFormat::Batch, "not json"),
			OutputView::Text("not json".into())
		);
		assert_eq!(
			OutputView::parse(OutputFormat::Image, json),
			OutputView::Text(json.into())
		);
	}
}
