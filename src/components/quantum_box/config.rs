//! Editor tunables, optionally supplied by the host page as inline JSON:
//!
//! ```html
//! <script type="application/json" id="editor-config">{ "generationTimeoutMs": 30000 }</script>
//! ```

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use super::graph::NodePlacement;

pub const CONFIG_ELEMENT_ID: &str = "editor-config";

/// Error type for loading the editor config.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The config source held no text.
	#[error("config is empty")]
	Empty,
	/// The text was not valid config JSON.
	#[error("serde error: {0}")]
	Serde(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorConfig {
	pub default_node_size: f64,
	pub drop_offset: f64,
	pub generation_timeout_ms: u32,
	pub orbit_radii: Vec<f64>,
	pub harmony_level: u8,
	pub style_rigidity: u8,
	pub redistribution_enabled: bool,
}

impl Default for EditorConfig {
	fn default() -> Self {
		let placement = NodePlacement::default();
		Self {
			default_node_size: placement.size,
			drop_offset: placement.offset,
			generation_timeout_ms: 60_000,
			orbit_radii: vec![150.0, 300.0, 450.0],
			harmony_level: 50,
			style_rigidity: 50,
			redistribution_enabled: false,
		}
	}
}

impl EditorConfig {
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		if text.trim().is_empty() {
			return Err(ConfigError::Empty);
		}
		Ok(serde_json::from_str(text)?)
	}

	/// Reads the inline config element if the page has one. Anything unreadable falls back
	/// to the defaults with a warning.
	pub fn from_document() -> Self {
		let text = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|e| e.text_content());
		let Some(text) = text else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("loaded editor config from #{CONFIG_ELEMENT_ID}");
				config
			}
			Err(e) => {
				warn!("ignoring #{CONFIG_ELEMENT_ID}: {e}");
				Self::default()
			}
		}
	}

	pub fn placement(&self) -> NodePlacement {
		NodePlacement {
			offset: self.drop_offset,
			size: self.default_node_size,
		}
	}
}
