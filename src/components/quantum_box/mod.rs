mod catalog;
mod component;
mod config;
mod generation;
mod graph;
mod interaction;
mod listeners;
mod panels;
mod render;
mod spatial;
mod state;
mod types;
mod weights;

pub use component::GraphCanvas;
pub use config::EditorConfig;
pub use generation::{Generator, PlaceholderGenerator};
pub use panels::{
	GenerateButton, HarmonySlider, LibraryPanel, OutputModal, SharedGenerator, Sidebar,
};
pub use state::EditorState;
