use log::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

/// Event listeners registered on the window for as long as this value lives.
///
/// Dropping it removes every listener it added. Use [`WindowListeners::release`] from
/// inside one of its own callbacks.
pub struct WindowListeners {
	window: Window,
	callbacks: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl WindowListeners {
	pub fn new(window: Window) -> Self {
		Self {
			window,
			callbacks: Vec::new(),
		}
	}

	/// Adds a listener for `event`, calling `handler` with events that cast to `E`.
	pub fn listen<E>(
		mut self,
		event: &'static str,
		mut handler: impl FnMut(E) + 'static,
	) -> Result<Self, JsValue>
	where
		E: JsCast + 'static,
	{
		let callback = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
			if let Ok(ev) = ev.dyn_into::<E>() {
				handler(ev);
			}
		});
		self.window
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		self.callbacks.push((event, callback));
		Ok(self)
	}

	fn detach(&self) {
		for (event, callback) in &self.callbacks {
			if let Err(e) = self
				.window
				.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			{
				error!("failed to remove {event} listener: {e:?}");
			}
		}
	}

	/// Removes the listeners now and frees the closures after the current event finishes
	/// dispatching, so a callback may release the set it belongs to.
	pub fn release(self) {
		self.detach();
		wasm_bindgen_futures::spawn_local(async move {
			drop(self);
		});
	}
}

impl Drop for WindowListeners {
	fn drop(&mut self) {
		self.detach();
	}
}
