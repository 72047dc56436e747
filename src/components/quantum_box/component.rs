use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, DragEvent, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent,
};

use super::interaction::Gesture;
use super::listeners::WindowListeners;
use super::render;
use super::state::{EditorAction, EditorState};
use super::types::Point;

/// Data transfer key carrying the tag of a template dragged out of the library.
pub const DRAG_DATA_KEY: &str = "nodeType";

type Listeners = StoredValue<Option<WindowListeners>, LocalStorage>;

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		f64::from(ev.client_x()) - rect.left(),
		f64::from(ev.client_y()) - rect.top(),
	))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (f64::from(p.client_width()), f64::from(p.client_height())))
		.unwrap_or((800.0, 600.0))
}

/// Window listeners for one gesture. Every way a gesture can end releases them.
fn attach_gesture_listeners(
	state: RwSignal<EditorState>,
	canvas_ref: NodeRef<leptos::html::Canvas>,
	listeners: Listeners,
) -> Result<WindowListeners, JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let end = move |action: EditorAction| {
		let active = state.try_update(|s| s.dispatch(action)).unwrap_or(false);
		if !active {
			if let Some(set) = listeners.try_update_value(Option::take).flatten() {
				debug!("gesture ended, releasing window listeners");
				set.release();
			}
		}
	};
	WindowListeners::new(window)
		.listen("mousemove", move |ev: MouseEvent| {
			if let Some(at) = local_point(canvas_ref, &ev) {
				state.update(|s| {
					s.dispatch(EditorAction::PointerMove(at));
				});
			}
		})?
		.listen("mouseup", move |ev: MouseEvent| match local_point(canvas_ref, &ev) {
			Some(at) => end(EditorAction::PointerUp(at)),
			None => end(EditorAction::CancelGesture),
		})?
		.listen("keydown", move |ev: KeyboardEvent| {
			if ev.key() == "Escape" {
				end(EditorAction::CancelGesture);
			}
		})?
		.listen("blur", move |_: Event| end(EditorAction::CancelGesture))
}

#[component]
pub fn GraphCanvas(
	state: RwSignal<EditorState>,
	/// Canvas size in pixels, kept in sync with the parent element.
	canvas_size: RwSignal<(f64, f64)>,
	orbit_radii: Vec<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface = StoredValue::new_local(None::<CanvasRenderingContext2d>);
	let gesture_listeners: Listeners = StoredValue::new_local(None);
	let resize_listener: Listeners = StoredValue::new_local(None);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
		let Some(ctx) = ctx else {
			error!("canvas has no 2d context");
			return;
		};
		surface.set_value(Some(ctx));

		let fit = move |canvas: &HtmlCanvasElement| {
			let (w, h) = parent_size(canvas);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
			canvas_size.set((w, h));
		};
		fit(&canvas);

		let Some(window) = web_sys::window() else {
			return;
		};
		match WindowListeners::new(window).listen("resize", move |_: Event| fit(&canvas)) {
			Ok(set) => resize_listener.set_value(Some(set)),
			Err(e) => error!("failed to listen for resize: {e:?}"),
		}
	});

	Effect::new(move |_| {
		let (w, h) = canvas_size.get();
		state.with(|s| {
			surface.with_value(|ctx| {
				if let Some(ctx) = ctx {
					render::render(s, ctx, w, h, &orbit_radii);
				}
			});
		});
	});

	on_cleanup(move || {
		let _ = gesture_listeners.try_update_value(Option::take);
		let _ = resize_listener.try_update_value(Option::take);
	});

	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		let active = state
			.try_update(|s| s.dispatch(EditorAction::PointerDown(at)))
			.unwrap_or(false);
		if !active || gesture_listeners.with_value(Option::is_some) {
			return;
		}
		match attach_gesture_listeners(state, canvas_ref, gesture_listeners) {
			Ok(set) => gesture_listeners.set_value(Some(set)),
			Err(e) => {
				error!("failed to attach gesture listeners: {e:?}");
				state.update(|s| {
					s.dispatch(EditorAction::CancelGesture);
				});
			}
		}
	};

	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		let tag = ev
			.data_transfer()
			.and_then(|dt| dt.get_data(DRAG_DATA_KEY).ok())
			.filter(|tag| !tag.is_empty());
		let (Some(tag), Some(at)) = (tag, local_point(canvas_ref, &ev)) else {
			return;
		};
		state.update(|s| {
			s.dispatch(EditorAction::DropTemplate { tag, at });
		});
	};

	let cursor = move || {
		let cursor = match state.with(|s| s.controller.gesture()) {
			Gesture::Idle => "default",
			Gesture::Moving { .. } => "grabbing",
			Gesture::Resizing { .. } => "nwse-resize",
			Gesture::Connecting { .. } => "crosshair",
		};
		format!("display: block; cursor: {cursor};")
	};
	let sun_ready = move || state.with(|s| s.output.is_some() && !s.generating);

	view! {
		<div class="quantum-box-canvas" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				on:mousedown=on_mousedown
				on:dragover=|ev: DragEvent| ev.prevent_default()
				on:drop=on_drop
				style=cursor
			/>
			<button
				class="sun"
				class:ready=sun_ready
				class:busy=move || state.with(|s| s.generating)
				title="Show generated output"
				on:click=move |_| {
					state.update(|s| {
						s.dispatch(EditorAction::ShowOutput(true));
					});
				}
				style="position: absolute; left: 50%; top: 50%; width: 64px; height: 64px; \
					transform: translate(-50%, -50%); border-radius: 50%; border: none; \
					background: radial-gradient(circle, #fde047, #f59e0b);"
			/>
		</div>
	}
}
