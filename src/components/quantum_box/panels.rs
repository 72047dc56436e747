use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen_futures::JsFuture;
use web_sys::DragEvent;

use super::catalog::{self, NodeTemplate};
use super::component::DRAG_DATA_KEY;
use super::generation::{self, BrowserTimer, GenerationOutcome, Generator, OutputView};
use super::state::{EditorAction, EditorState, GeneratedOutput, MAX_LEVEL, SidebarTab};
use super::types::{MAX_NODE_SIZE, MIN_NODE_SIZE, NodeBody, NodeId, OutputFormat, Point};

/// Page-owned generator. The handle is `Copy + Send`, so views can capture it; the `Rc`
/// itself stays in local storage.
pub type SharedGenerator = StoredValue<Rc<dyn Generator>, LocalStorage>;

fn dispatch(state: RwSignal<EditorState>, action: EditorAction) {
	state.update(|s| {
		s.dispatch(action);
	});
}

fn copy_to_clipboard(text: String) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let promise = window.navigator().clipboard().write_text(&text);
	wasm_bindgen_futures::spawn_local(async move {
		match JsFuture::from(promise).await {
			Ok(_) => info!("copied {} chars to the clipboard", text.len()),
			Err(e) => warn!("clipboard write failed: {e:?}"),
		}
	});
}

fn tag_name(tag: &str) -> String {
	catalog::template_for(tag).map_or_else(|| tag.to_owned(), |t| t.name.to_owned())
}

#[component]
fn TemplateCard(state: RwSignal<EditorState>, template: &'static NodeTemplate) -> impl IntoView {
	let tag = template.tag;
	view! {
		<div
			class="template-card"
			draggable="true"
			title=template.description
			style=format!("border-left: 4px solid {};", template.category.colour())
			on:dragstart=move |ev: DragEvent| {
				if let Some(dt) = ev.data_transfer() {
					dt.set_effect_allowed("copy");
					if let Err(e) = dt.set_data(DRAG_DATA_KEY, tag) {
						warn!("could not start drag for {tag}: {e:?}");
					}
				}
			}
			on:click=move |_| dispatch(state, EditorAction::PreviewTemplate(tag))
		>
			{template.name}
		</div>
	}
}

/// Draggable templates, grouped by category.
#[component]
pub fn LibraryPanel(state: RwSignal<EditorState>) -> impl IntoView {
	let sections = catalog::by_category()
		.into_iter()
		.map(|(category, templates)| {
			view! {
				<section class="library-category">
					<h3 style=format!("color: {};", category.colour())>{category.label()}</h3>
					{templates
						.into_iter()
						.map(|template| view! { <TemplateCard state template /> })
						.collect_view()}
				</section>
			}
		})
		.collect_view();
	view! {
		<aside class="library-panel">
			<h2>"Tag Library"</h2>
			{sections}
		</aside>
	}
}

fn value_editor(state: RwSignal<EditorState>, id: NodeId, body: &NodeBody) -> AnyView {
	let current = move || {
		state.with(|s| {
			s.graph
				.node(id)
				.map(|n| n.value().to_owned())
				.unwrap_or_default()
		})
	};
	let set = move |value: String| dispatch(state, EditorAction::SetNodeValue { node: id, value });
	match body {
		NodeBody::Input { .. } => view! {
			<input type="text" prop:value=current on:input=move |ev| set(event_target_value(&ev)) />
		}
		.into_any(),
		NodeBody::Text { .. } => view! {
			<textarea rows="4" prop:value=current on:input=move |ev| set(event_target_value(&ev)) />
		}
		.into_any(),
		NodeBody::Option { options, .. } => {
			let choices = options
				.iter()
				.map(|o| {
					let value = o.value.clone();
					view! {
						<option value=o.value.clone() prop:selected=move || current() == value>
							{o.label.clone()}
						</option>
					}
				})
				.collect_view();
			view! {
				<select on:change=move |ev| set(event_target_value(&ev))>
					<option value="" prop:selected=move || current().is_empty()>"None"</option>
					{choices}
				</select>
			}
			.into_any()
		}
		NodeBody::Output { .. } => {
			let choices = OutputFormat::ALL
				.iter()
				.map(|&f| {
					view! {
						<option value=f.as_str() prop:selected=move || current() == f.as_str()>
							{f.label()}
						</option>
					}
				})
				.collect_view();
			view! {
				<select on:change=move |ev| set(event_target_value(&ev))>
					{choices}
				</select>
			}
			.into_any()
		}
	}
}

fn node_inspector(state: RwSignal<EditorState>, id: NodeId) -> AnyView {
	let Some((name, description, body)) = state.with_untracked(|s| {
		s.graph
			.node(id)
			.map(|n| (n.name.clone(), n.description.clone(), n.body.clone()))
	}) else {
		return ().into_any();
	};
	let size = move || state.with(|s| s.graph.node(id).map_or(0.0, |n| n.size).to_string());
	view! {
		<div class="node-inspector">
			<h3>{name}</h3>
			<p class="description">{description}</p>
			<label>"Value" {value_editor(state, id, &body)}</label>
			<label>
				"Size"
				<input
					type="range"
					min=MIN_NODE_SIZE.to_string()
					max=MAX_NODE_SIZE.to_string()
					prop:value=size
					on:input=move |ev| {
						if let Ok(size) = event_target_value(&ev).parse::<f64>() {
							dispatch(state, EditorAction::SetNodeSize { node: id, size });
						}
					}
				/>
			</label>
			<button class="danger" on:click=move |_| dispatch(state, EditorAction::DeleteNode(id))>
				"Delete Planet"
			</button>
		</div>
	}
	.into_any()
}

#[derive(Clone, Copy, PartialEq)]
enum Inspected {
	Template(&'static str),
	Node(NodeId),
	Nothing,
}

/// Details of the previewed template or the selected node.
#[component]
pub fn InspectorPanel(state: RwSignal<EditorState>) -> impl IntoView {
	let inspected = Memo::new(move |_| {
		state.with(|s| match (s.preview, s.selected()) {
			(Some(tag), _) => Inspected::Template(tag),
			(None, Some(node)) => Inspected::Node(node.id),
			(None, None) => Inspected::Nothing,
		})
	});
	move || match inspected.get() {
		Inspected::Template(tag) => match catalog::template_for(tag) {
			Some(t) => view! {
				<div class="template-preview">
					<h3>{t.name}</h3>
					<p class="category">{t.category.label()}</p>
					<p class="description">{t.description}</p>
					<p class="hint">"Drag it onto the canvas to add it."</p>
				</div>
			}
			.into_any(),
			None => ().into_any(),
		},
		Inspected::Node(id) => node_inspector(state, id),
		Inspected::Nothing => view! {
			<p class="hint">"Select a planet to edit it, or pick a tag from the library."</p>
		}
		.into_any(),
	}
}

/// Weighting switch, style rigidity and the per-group tag weights.
#[component]
pub fn WeightsPanel(state: RwSignal<EditorState>) -> impl IntoView {
	let enabled = move || state.with(|s| s.settings.redistribution_enabled);
	let rigidity = move || state.with(|s| s.settings.style_rigidity.to_string());
	let groups = state.with_untracked(|s| {
		s.weights
			.groups()
			.map(|(name, tags)| (name.to_owned(), tags.to_vec()))
			.collect::<Vec<_>>()
	});
	let groups = groups
		.into_iter()
		.map(|(name, tags)| {
			let sliders = tags
				.into_iter()
				.map(|tag| {
					let label = tag_name(&tag);
					let key = tag.clone();
					let percent = move || {
						state.with(|s| ((s.weights.get_weight(&key) * 100.0).round() as i64).to_string())
					};
					view! {
						<label class="weight">
							{label}
							<input
								type="range"
								min="0"
								max="200"
								prop:value=percent.clone()
								on:input=move |ev| {
									if let Ok(p) = event_target_value(&ev).parse::<f64>() {
										dispatch(
											state,
											EditorAction::SetWeight {
												tag: tag.clone(),
												weight: p / 100.0,
											},
										);
									}
								}
							/>
							<span>{percent}"%"</span>
						</label>
					}
				})
				.collect_view();
			view! {
				<fieldset class="weight-group">
					<legend>{name}</legend>
					{sliders}
				</fieldset>
			}
		})
		.collect_view();

	view! {
		<div class="weights-panel">
			<label>
				<input
					type="checkbox"
					prop:checked=enabled
					on:change=move |ev| {
						dispatch(state, EditorAction::SetRedistribution(event_target_checked(&ev)));
					}
				/>
				"Enable Tag Weighting"
			</label>
			<label>
				"Style Rigidity"
				<input
					type="range"
					min="0"
					max=MAX_LEVEL.to_string()
					prop:value=rigidity
					on:input=move |ev| {
						if let Ok(v) = event_target_value(&ev).parse::<i64>() {
							dispatch(state, EditorAction::SetStyleRigidity(v));
						}
					}
				/>
			</label>
			{groups}
		</div>
	}
}

/// Tabbed right-hand sidebar.
#[component]
pub fn Sidebar(state: RwSignal<EditorState>) -> impl IntoView {
	let tab = Memo::new(move |_| state.with(|s| s.tab));
	let tab_button = move |target: SidebarTab, label: &'static str| {
		view! {
			<button
				class:active=move || tab.get() == target
				on:click=move |_| dispatch(state, EditorAction::ShowTab(target))
			>
				{label}
			</button>
		}
	};
	view! {
		<aside class="sidebar">
			<nav class="tabs">
				{tab_button(SidebarTab::Inspector, "Inspector")}
				{tab_button(SidebarTab::Weights, "Weights")}
			</nav>
			{move || match tab.get() {
				SidebarTab::Inspector => view! { <InspectorPanel state /> }.into_any(),
				SidebarTab::Weights => view! { <WeightsPanel state /> }.into_any(),
			}}
		</aside>
	}
}

/// Leans the next generation towards harmony or tension.
#[component]
pub fn HarmonySlider(state: RwSignal<EditorState>) -> impl IntoView {
	let level = move || state.with(|s| s.settings.harmony_level.to_string());
	view! {
		<label class="harmony-slider">
			<span>"Tension"</span>
			<input
				type="range"
				min="0"
				max=MAX_LEVEL.to_string()
				prop:value=level
				on:input=move |ev| {
					if let Ok(v) = event_target_value(&ev).parse::<i64>() {
						dispatch(state, EditorAction::SetHarmonyLevel(v));
					}
				}
			/>
			<span>"Harmony"</span>
		</label>
	}
}

/// Starts a generation for the current graph. Ignored while one is already running.
#[component]
pub fn GenerateButton(
	state: RwSignal<EditorState>,
	canvas_size: RwSignal<(f64, f64)>,
	generator: SharedGenerator,
	timeout_ms: u32,
) -> impl IntoView {
	let busy = move || state.with(|s| s.generating);
	let on_click = move |_| {
		if state.with_untracked(|s| s.generating) {
			return;
		}
		let (w, h) = canvas_size.get_untracked();
		let centre = Point::new(w / 2.0, h / 2.0);
		let (prepared, format) = state.with_untracked(|s| {
			(
				generation::prepare(&s.graph, &s.weights, &s.settings, centre),
				s.requested_format(),
			)
		});
		dispatch(state, EditorAction::GenerationStarted);
		let generator = generator.get_value();
		wasm_bindgen_futures::spawn_local(async move {
			let outcome =
				generation::run(prepared, generator.as_ref(), &BrowserTimer, timeout_ms).await;
			dispatch(
				state,
				EditorAction::GenerationFinished(GeneratedOutput { format, outcome }),
			);
		});
	};
	view! {
		<button class="generate" prop:disabled=busy on:click=on_click>
			{move || if busy() { "Generating..." } else { "Generate" }}
		</button>
	}
}

fn output_body(output: &GeneratedOutput) -> AnyView {
	let GenerationOutcome::Completed(text) = &output.outcome else {
		return view! { <p class="error">{output.outcome.display_text()}</p> }.into_any();
	};
	match OutputView::parse(output.format, text) {
		OutputView::Text(text) => {
			let copy = text.clone();
			view! {
				<pre class="output-text">{text}</pre>
				<button on:click=move |_| copy_to_clipboard(copy.clone())>"Copy"</button>
			}
			.into_any()
		}
		OutputView::Prompts(prompts) => prompts
			.into_iter()
			.enumerate()
			.map(|(i, p)| {
				let copy = p.prompt.clone();
				view! {
					<div class="prompt-card">
						<h4>{format!("Prompt {}", i + 1)}</h4>
						<p>{p.prompt}</p>
						<p class="explanation">{p.explanation}</p>
						<button on:click=move |_| copy_to_clipboard(copy.clone())>"Copy"</button>
					</div>
				}
			})
			.collect_view()
			.into_any(),
	}
}

/// Result of the last generation, shown after clicking the sun.
#[component]
pub fn OutputModal(state: RwSignal<EditorState>) -> impl IntoView {
	let close = move |_| dispatch(state, EditorAction::ShowOutput(false));
	move || {
		let output = state.with(|s| s.output.clone().filter(|_| s.output_visible))?;
		Some(view! {
			<div class="modal-backdrop" on:click=close>
				<div class="modal" on:click=|ev| ev.stop_propagation()>
					<h2>{format!("Generated {}", output.format.label())}</h2>
					{output_body(&output)}
					<button on:click=close>"Close"</button>
				</div>
			</div>
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn capturable<T: Send + Sync + Copy>() {}

	#[test]
	fn generator_handle_can_be_captured_by_views() {
		capturable::<SharedGenerator>();
		capturable::<RwSignal<EditorState>>();
	}
}
