//! Tag importance weights.
//!
//! Every tag carries a weight in `[0, 2]`, defaulting to `1.0`. When redistribution is
//! enabled, moving one tag's weight spreads the opposite change evenly over the other
//! members of its group so the group keeps roughly the same total budget.
//!
//! Members already near a bound absorb less than their share: their result is clamped and
//! the unabsorbed remainder is dropped, not handed to the other members. The group total
//! is only conserved while no member saturates.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use super::catalog;

pub const MIN_WEIGHT: f64 = 0.0;
pub const MAX_WEIGHT: f64 = 2.0;
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Glow radius in pixels per unit of weight above the default.
const GLOW_PER_WEIGHT: f64 = 15.0;

fn clamp_weight(weight: f64) -> f64 {
	weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

#[derive(Clone, Debug, PartialEq)]
struct Group {
	name: String,
	tags: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightStore {
	weights: HashMap<String, f64>,
	groups: Vec<Group>,
}

impl WeightStore {
	pub fn new<G, T>(groups: G) -> Self
	where
		G: IntoIterator<Item = (String, T)>,
		T: IntoIterator<Item = String>,
	{
		Self {
			weights: HashMap::new(),
			groups: groups
				.into_iter()
				.map(|(name, tags)| Group {
					name,
					tags: tags.into_iter().collect(),
				})
				.collect(),
		}
	}

	/// Store seeded from the tag library: every non-output tag at the default weight.
	pub fn from_catalog() -> Self {
		let mut store = Self::new(catalog::groups().iter().map(|g| {
			(g.name.to_owned(), g.tags.iter().map(|t| (*t).to_owned()))
		}));
		for template in catalog::templates().iter().filter(|t| !t.is_output()) {
			store.weights.insert(template.tag.to_owned(), DEFAULT_WEIGHT);
		}
		store
	}

	pub fn get_weight(&self, tag: &str) -> f64 {
		self.weights.get(tag).copied().unwrap_or(DEFAULT_WEIGHT)
	}

	/// Members of the group `tag` belongs to, including `tag` itself.
	pub fn group_of(&self, tag: &str) -> Option<&[String]> {
		self.groups
			.iter()
			.find(|g| g.tags.iter().any(|t| t == tag))
			.map(|g| g.tags.as_slice())
	}

	pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.groups.iter().map(|g| (g.name.as_str(), g.tags.as_slice()))
	}

	/// Sets `tag` to `new_weight`, clamped to `[0, 2]`.
	///
	/// With `redistribute` on and at least one other member in the tag's group, each other
	/// member moves by `-(new - old) / n`, clamped. Non-finite input is ignored.
	pub fn set_weight(&mut self, tag: &str, new_weight: f64, redistribute: bool) {
		if !new_weight.is_finite() {
			debug!("ignoring non-finite weight {new_weight} for {tag}");
			return;
		}
		let target = clamp_weight(new_weight);
		let others: Vec<String> = match self.group_of(tag) {
			Some(members) if redistribute => {
				members.iter().filter(|t| *t != tag).cloned().collect()
			}
			_ => Vec::new(),
		};

		if others.is_empty() {
			trace!("weight {tag} = {target:.2}");
			self.weights.insert(tag.to_owned(), target);
			return;
		}

		let delta = new_weight - self.get_weight(tag);
		let share = -delta / others.len() as f64;
		self.weights.insert(tag.to_owned(), target);
		for other in others {
			let adjusted = clamp_weight(self.get_weight(&other) + share);
			self.weights.insert(other, adjusted);
		}
		debug!("weight {tag} = {target:.2}, group peers shifted by {share:+.3}");
	}

	/// Ordered copy of every known weight, handed to the generator.
	pub fn snapshot(&self) -> BTreeMap<String, f64> {
		self.weights.iter().map(|(k, v)| (k.clone(), *v)).collect()
	}

	/// Glow radius for a node of this tag; zero unless weighting is on and the weight is
	/// above the default.
	pub fn glow(&self, tag: &str, weighting_enabled: bool) -> f64 {
		if !weighting_enabled {
			return 0.0;
		}
		((self.get_weight(tag) - DEFAULT_WEIGHT) * GLOW_PER_WEIGHT).max(0.0)
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;
	use proptest::prelude::*;

	use super::*;

	fn xyz() -> WeightStore {
		WeightStore::new([
			("trio".to_owned(), vec!["x".to_owned(), "y".to_owned(), "z".to_owned()]),
			("solo".to_owned(), vec!["s".to_owned()]),
		])
	}

	fn group_sum(store: &WeightStore) -> f64 {
		["x", "y", "z"].iter().map(|t| store.get_weight(t)).sum()
	}

	#[test]
	fn unknown_tags_read_as_default() {
		let store = WeightStore::default();
		assert_relative_eq!(store.get_weight("nothing"), 1.0, epsilon = 1e-9);
	}

	#[test]
	fn raising_one_member_lowers_its_peers_evenly() {
		let mut store = xyz();
		store.set_weight("x", 1.6, true);
		// delta 0.6 over two peers
		assert_relative_eq!(store.get_weight("x"), 1.6, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("y"), 0.7, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("z"), 0.7, epsilon = 1e-9);
		assert_relative_eq!(group_sum(&store), 3.0, epsilon = 1e-9);
	}

	#[test]
	fn peer_at_the_ceiling_still_takes_a_negative_share() {
		let mut store = xyz();
		store.set_weight("y", 2.0, false);
		store.set_weight("x", 1.4, true);
		assert_relative_eq!(store.get_weight("x"), 1.4, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("y"), 1.8, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("z"), 0.8, epsilon = 1e-9);
	}

	#[test]
	fn saturated_peer_stays_on_its_bound() {
		let mut store = xyz();
		store.set_weight("y", 2.0, false);
		store.set_weight("x", 0.4, true);
		// share is +0.3: y would reach 2.3 and clamps, z takes 1.3
		assert_relative_eq!(store.get_weight("x"), 0.4, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("y"), 2.0, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("z"), 1.3, epsilon = 1e-9);
		assert!(group_sum(&store) < 4.0);
	}

	#[test]
	fn disabled_redistribution_touches_only_the_target() {
		let mut store = xyz();
		store.set_weight("x", 1.9, false);
		assert_relative_eq!(store.get_weight("x"), 1.9, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("y"), 1.0, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("z"), 1.0, epsilon = 1e-9);
	}

	#[test]
	fn single_member_group_and_ungrouped_tags_overwrite_directly() {
		let mut store = xyz();
		store.set_weight("s", 0.3, true);
		store.set_weight("loose", 1.7, true);
		assert_relative_eq!(store.get_weight("s"), 0.3, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("loose"), 1.7, epsilon = 1e-9);
		assert_relative_eq!(group_sum(&store), 3.0, epsilon = 1e-9);
	}

	#[test]
	fn target_is_clamped_and_nan_ignored() {
		let mut store = xyz();
		store.set_weight("x", 7.0, false);
		assert_relative_eq!(store.get_weight("x"), 2.0, epsilon = 1e-9);
		store.set_weight("x", f64::NAN, true);
		assert_relative_eq!(store.get_weight("x"), 2.0, epsilon = 1e-9);
	}

	#[test]
	fn out_of_range_request_spreads_the_unclamped_delta() {
		let mut store = xyz();
		store.set_weight("x", 3.0, true);
		// delta 2.0 over two peers
		assert_relative_eq!(store.get_weight("x"), 2.0, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("y"), 0.0, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("z"), 0.0, epsilon = 1e-9);

		let mut store = xyz();
		store.set_weight("x", -1.0, true);
		assert_relative_eq!(store.get_weight("x"), 0.0, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("y"), 2.0, epsilon = 1e-9);
		assert_relative_eq!(store.get_weight("z"), 2.0, epsilon = 1e-9);
	}

	#[test]
	fn catalog_store_knows_every_non_output_tag() {
		let store = WeightStore::from_catalog();
		let snapshot = store.snapshot();
		assert!(snapshot.contains_key("genre"));
		assert!(!snapshot.contains_key(catalog::OUTPUT_TAG));
		assert!(snapshot.values().all(|w| (*w - 1.0).abs() < f64::EPSILON));
	}

	#[test]
	fn glow_only_above_default_and_when_enabled() {
		let mut store = xyz();
		store.set_weight("x", 1.5, false);
		assert_relative_eq!(store.glow("x", true), 7.5, epsilon = 1e-9);
		assert_relative_eq!(store.glow("x", false), 0.0, epsilon = 1e-9);
		store.set_weight("x", 0.5, false);
		assert_relative_eq!(store.glow("x", true), 0.0, epsilon = 1e-9);
	}

	proptest! {
		#[test]
		fn weights_stay_in_bounds(
			steps in prop::collection::vec((0usize..4, -1.0f64..3.0, any::<bool>()), 1..40)
		) {
			let tags = ["x", "y", "z", "s"];
			let mut store = xyz();
			for (i, w, redistribute) in steps {
				store.set_weight(tags[i], w, redistribute);
				for t in tags {
					let w = store.get_weight(t);
					prop_assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&w));
				}
			}
		}

		#[test]
		fn unsaturated_moves_conserve_the_group_total(target in 0.6f64..1.4) {
			let mut store = xyz();
			store.set_weight("x", target, true);
			prop_assert!((group_sum(&store) - 3.0).abs() < 1e-9);
		}
	}
}
