use std::rc::Rc;

use leptos::prelude::*;

use crate::components::quantum_box::{
	EditorConfig, EditorState, GenerateButton, Generator, GraphCanvas, HarmonySlider,
	LibraryPanel, OutputModal, PlaceholderGenerator, SharedGenerator, Sidebar,
};

/// The prompt editor: tag library, canvas and sidebar.
#[component]
pub fn Home() -> impl IntoView {
	let config = EditorConfig::from_document();
	let state = RwSignal::new(EditorState::new(&config));
	let canvas_size = RwSignal::new((0.0, 0.0));
	let generator: SharedGenerator =
		StoredValue::new_local(Rc::new(PlaceholderGenerator) as Rc<dyn Generator>);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="quantum-box" style="display: flex; height: 100vh;">
				<LibraryPanel state />
				<main style="flex: 1; display: flex; flex-direction: column;">
					<header class="toolbar">
						<h1>"Quantum Box"</h1>
						<HarmonySlider state />
						<GenerateButton
							state
							canvas_size
							generator
							timeout_ms=config.generation_timeout_ms
						/>
					</header>
					<div style="flex: 1; min-height: 0;">
						<GraphCanvas state canvas_size orbit_radii=config.orbit_radii.clone() />
					</div>
				</main>
				<Sidebar state />
			</div>
			<OutputModal state />
		</ErrorBoundary>
	}
}
