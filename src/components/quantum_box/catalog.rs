//! Static tag library: the node templates a user can drop on the canvas and the groups
//! whose weights trade off against each other.

use serde::Serialize;

use super::types::{NodeBody, NodeOption, OutputFormat};

/// Tag of the node that decides what kind of output a generation produces.
pub const OUTPUT_TAG: &str = "promptOutput";
/// Batch generations need a master shot connected to at least one variant.
pub const MASTER_TAG: &str = "masterShot";
pub const VARIANT_TAG: &str = "shotVariant";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
	Core,
	Story,
	Shot,
	Video,
	Edit,
}

impl Category {
	pub const ALL: [Category; 5] = [Self::Core, Self::Story, Self::Shot, Self::Video, Self::Edit];

	pub fn label(self) -> &'static str {
		match self {
			Self::Core => "Core",
			Self::Story => "Story",
			Self::Shot => "Shot",
			Self::Video => "Video",
			Self::Edit => "Edit",
		}
	}

	pub fn colour(self) -> &'static str {
		match self {
			Self::Core => "#6366f1",
			Self::Story => "#10b981",
			Self::Shot => "#f59e0b",
			Self::Video => "#0ea5e9",
			Self::Edit => "#f43f5e",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TemplateKind {
	Input,
	Text,
	Option(&'static [(&'static str, &'static str)]),
	Output,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTemplate {
	pub tag: &'static str,
	pub name: &'static str,
	pub description: &'static str,
	pub category: Category,
	pub kind: TemplateKind,
}

impl NodeTemplate {
	/// Fresh body for a newly dropped node: empty text, the first option, or image output.
	pub fn body(&self) -> NodeBody {
		match self.kind {
			TemplateKind::Input => NodeBody::Input { value: String::new() },
			TemplateKind::Text => NodeBody::Text { value: String::new() },
			TemplateKind::Option(options) => NodeBody::Option {
				value: options.first().map(|(v, _)| (*v).to_owned()).unwrap_or_default(),
				options: options
					.iter()
					.map(|(value, label)| NodeOption {
						value: (*value).to_owned(),
						label: (*label).to_owned(),
					})
					.collect(),
			},
			TemplateKind::Output => NodeBody::Output { format: OutputFormat::default() },
		}
	}

	pub fn is_output(&self) -> bool {
		matches!(self.kind, TemplateKind::Output)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagGroup {
	pub name: &'static str,
	pub tags: &'static [&'static str],
}

const fn template(
	tag: &'static str,
	name: &'static str,
	description: &'static str,
	category: Category,
	kind: TemplateKind,
) -> NodeTemplate {
	NodeTemplate { tag, name, description, category, kind }
}

static TEMPLATES: &[NodeTemplate] = &[
	template(
		"logline",
		"Logline",
		"One sentence that captures the whole idea.",
		Category::Core,
		TemplateKind::Text,
	),
	template(
		"styleReference",
		"Style Reference",
		"An artist, film or movement to borrow a look from.",
		Category::Core,
		TemplateKind::Input,
	),
	template(
		OUTPUT_TAG,
		"AI Prompt Output",
		"Decides what the generator produces from everything orbiting the sun.",
		Category::Core,
		TemplateKind::Output,
	),
	template(
		"genre",
		"Genre",
		"The storytelling tradition the piece belongs to.",
		Category::Story,
		TemplateKind::Option(&[
			("drama", "Drama"),
			("comedy", "Comedy"),
			("thriller", "Thriller"),
			("scifi", "Science fiction"),
			("fantasy", "Fantasy"),
			("horror", "Horror"),
		]),
	),
	template(
		"tone",
		"Tone",
		"The emotional colour of the piece.",
		Category::Story,
		TemplateKind::Option(&[
			("hopeful", "Hopeful"),
			("melancholic", "Melancholic"),
			("tense", "Tense"),
			("whimsical", "Whimsical"),
			("bleak", "Bleak"),
		]),
	),
	template(
		"theme",
		"Theme",
		"What the story is really about underneath the plot.",
		Category::Story,
		TemplateKind::Text,
	),
	template(
		"character",
		"Protagonist",
		"Who we follow, and what they want.",
		Category::Story,
		TemplateKind::Text,
	),
	template(
		"setting",
		"Setting",
		"Where and when it happens.",
		Category::Story,
		TemplateKind::Text,
	),
	template(
		"shotType",
		"Shot Type",
		"How much of the subject the frame holds.",
		Category::Shot,
		TemplateKind::Option(&[
			("wide", "Wide"),
			("medium", "Medium"),
			("closeUp", "Close-up"),
			("extremeCloseUp", "Extreme close-up"),
			("overShoulder", "Over the shoulder"),
		]),
	),
	template(
		"cameraAngle",
		"Camera Angle",
		"Where the camera sits relative to the subject.",
		Category::Shot,
		TemplateKind::Option(&[
			("eyeLevel", "Eye level"),
			("low", "Low angle"),
			("high", "High angle"),
			("dutch", "Dutch tilt"),
			("birdsEye", "Bird's eye"),
		]),
	),
	template(
		"lighting",
		"Lighting",
		"The quality and direction of light.",
		Category::Shot,
		TemplateKind::Option(&[
			("natural", "Natural"),
			("highKey", "High key"),
			("lowKey", "Low key"),
			("goldenHour", "Golden hour"),
			("neon", "Neon"),
		]),
	),
	template(
		MASTER_TAG,
		"Master Shot",
		"The reference frame every batch variant is derived from.",
		Category::Shot,
		TemplateKind::Text,
	),
	template(
		VARIANT_TAG,
		"Shot Variant",
		"A variation on the master shot, generated in the same batch.",
		Category::Shot,
		TemplateKind::Text,
	),
	template(
		"cameraMovement",
		"Camera Movement",
		"How the camera travels through the scene.",
		Category::Video,
		TemplateKind::Option(&[
			("static", "Static"),
			("pan", "Pan"),
			("tilt", "Tilt"),
			("dolly", "Dolly"),
			("handheld", "Handheld"),
			("crane", "Crane"),
		]),
	),
	template(
		"duration",
		"Duration",
		"Running time of the clip.",
		Category::Video,
		TemplateKind::Input,
	),
	template(
		"soundscape",
		"Soundscape",
		"What we hear: score, ambience, silence.",
		Category::Video,
		TemplateKind::Text,
	),
	template(
		"pacing",
		"Pacing",
		"How quickly the cuts come.",
		Category::Edit,
		TemplateKind::Option(&[
			("slow", "Slow"),
			("measured", "Measured"),
			("brisk", "Brisk"),
			("frenetic", "Frenetic"),
		]),
	),
	template(
		"transition",
		"Transition",
		"How one shot hands over to the next.",
		Category::Edit,
		TemplateKind::Option(&[
			("cut", "Straight cut"),
			("dissolve", "Dissolve"),
			("matchCut", "Match cut"),
			("whipPan", "Whip pan"),
			("fade", "Fade"),
		]),
	),
	template(
		"colorGrade",
		"Color Grade",
		"The final palette of the image.",
		Category::Edit,
		TemplateKind::Option(&[
			("tealOrange", "Teal and orange"),
			("bleachBypass", "Bleach bypass"),
			("monochrome", "Monochrome"),
			("pastel", "Pastel"),
			("vivid", "Vivid"),
		]),
	),
];

static GROUPS: &[TagGroup] = &[
	TagGroup {
		name: "Narrative",
		tags: &["genre", "tone", "theme", "character", "setting"],
	},
	TagGroup {
		name: "Cinematography",
		tags: &["shotType", "cameraAngle", "lighting"],
	},
	TagGroup {
		name: "Motion & Sound",
		tags: &["cameraMovement", "duration", "soundscape"],
	},
	TagGroup {
		name: "Post-production",
		tags: &["pacing", "transition", "colorGrade"],
	},
	TagGroup {
		name: "Reference",
		tags: &["styleReference"],
	},
];

pub fn templates() -> &'static [NodeTemplate] {
	TEMPLATES
}

pub fn template_for(tag: &str) -> Option<&'static NodeTemplate> {
	TEMPLATES.iter().find(|t| t.tag == tag)
}

pub fn groups() -> &'static [TagGroup] {
	GROUPS
}

/// Templates bucketed by category, categories and members in catalog order.
pub fn by_category() -> Vec<(Category, Vec<&'static NodeTemplate>)> {
	Category::ALL
		.into_iter()
		.map(|c| (c, TEMPLATES.iter().filter(|t| t.category == c).collect::<Vec<_>>()))
		.filter(|(_, members)| !members.is_empty())
		.collect()
}
