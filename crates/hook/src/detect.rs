//! Recipe detection from menu contents.
//!
//! The item in the result slot is read through an ordered chain; the first
//! stage that yields an identifier wins:
//!
//! 1. structured item metadata (only items the item plugin manages carry a type),
//! 2. the raw tag layer,
//! 3. the colour-stripped display name, if it names a configured recipe,
//! 4. the host-supplied [`RecipeCatalog`].
//!
//! When every stage fails the fallback key is used.

use std::fmt;

use crafthook_primitives::text::strip_color_codes;
use crafthook_primitives::{ItemSnapshot, MenuView, RecipeKey, TagRead};
use crafthook_rules::{MenuSettings, RuleSnapshot};

/// Stage that produced a recipe key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionSource {
	StructuredMetadata,
	RawTag,
	DisplayName,
	Catalog,
	Fallback,
}

impl fmt::Display for DetectionSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::StructuredMetadata => "structured",
			Self::RawTag => "raw-tag",
			Self::DisplayName => "display-name",
			Self::Catalog => "catalog",
			Self::Fallback => "fallback",
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
	pub key: RecipeKey,
	pub source: DetectionSource,
}

impl Detection {
	pub fn fallback() -> Self {
		Self {
			key: RecipeKey::fallback(),
			source: DetectionSource::Fallback,
		}
	}
}

/// Why one detection stage gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
	#[error("result slot is empty")]
	EmptyResult,
	#[error("{layer} layer is absent")]
	Missing { layer: &'static str },
	#[error("{layer} layer is unreadable: {reason}")]
	Corrupt { layer: &'static str, reason: String },
	#[error("item has no type; not a managed item")]
	Untyped,
	#[error("tag '{tag}' is missing or blank")]
	MissingTag { tag: String },
	#[error("no configured recipe matches the display name")]
	NoDisplayMatch,
	#[error("no catalog recipe matches")]
	NoCatalogMatch,
}

/// Recipe definition known to the host, used as a last resort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecipe {
	pub key: RecipeKey,
	/// Display name of the crafted item.
	pub result_name: String,
	/// Display names or materials of the required items.
	pub ingredients: Vec<String>,
}

impl CatalogRecipe {
	pub fn new(key: RecipeKey, result_name: impl Into<String>, ingredients: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			key,
			result_name: result_name.into(),
			ingredients: ingredients.into_iter().map(Into::into).collect(),
		}
	}
}

/// Host-supplied recipe definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeCatalog {
	recipes: Vec<CatalogRecipe>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Score {
	result_exact: bool,
	ingredient_exact: usize,
	overlaps: usize,
}

impl RecipeCatalog {
	pub fn new(recipes: impl IntoIterator<Item = CatalogRecipe>) -> Self {
		Self {
			recipes: recipes.into_iter().collect(),
		}
	}

	pub fn len(&self) -> usize {
		self.recipes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.recipes.is_empty()
	}

	/// Best-scoring recipe for the observed result name and ingredients.
	///
	/// Candidates are ranked by exact result-name match, then number of exact
	/// ingredient matches, then number of substring overlaps. Ties go to the
	/// lexicographically lowest key. A candidate with no match at all is never
	/// chosen.
	pub fn best_match(&self, result_name: Option<&str>, ingredients: &[String]) -> Option<&RecipeKey> {
		let result_name = result_name.map(normalize_name);
		let observed: Vec<String> = ingredients.iter().map(|s| normalize_name(s)).collect();

		self.recipes
			.iter()
			.filter_map(|recipe| {
				let score = score(recipe, result_name.as_deref(), &observed);
				(score != Score::default()).then_some((score, &recipe.key))
			})
			.max_by(|(a, ka), (b, kb)| a.cmp(b).then_with(|| kb.cmp(ka)))
			.map(|(_, key)| key)
	}
}

fn score(recipe: &CatalogRecipe, result_name: Option<&str>, observed: &[String]) -> Score {
	let mut score = Score::default();
	let wanted = normalize_name(&recipe.result_name);

	if let Some(name) = result_name
		&& !name.is_empty()
		&& !wanted.is_empty()
	{
		if name == wanted {
			score.result_exact = true;
		} else if name.contains(&wanted) || wanted.contains(name) {
			score.overlaps += 1;
		}
	}

	for ingredient in &recipe.ingredients {
		let ingredient = normalize_name(ingredient);
		if ingredient.is_empty() {
			continue;
		}
		if observed.iter().any(|seen| *seen == ingredient) {
			score.ingredient_exact += 1;
		} else if observed
			.iter()
			.any(|seen| !seen.is_empty() && (seen.contains(&ingredient) || ingredient.contains(seen.as_str())))
		{
			score.overlaps += 1;
		}
	}
	score
}

fn normalize_name(raw: &str) -> String {
	strip_color_codes(raw).trim().to_lowercase()
}

/// True when the marker item identifying the host menu is present.
pub fn indicator_valid(view: &dyn MenuView, menu: &MenuSettings) -> bool {
	view.item(menu.indicator_slot)
		.and_then(|item| item.custom_model_data)
		.is_some_and(|data| data == menu.indicator_model_data)
}

/// Runs the detection chain against `view`.
pub fn detect_recipe(view: &dyn MenuView, rules: &RuleSnapshot, catalog: &RecipeCatalog) -> Detection {
	let settings = rules.settings();
	let menu = &settings.menu;
	let Some(result) = view.item(menu.result_slot) else {
		trace_stage(settings.debug, DetectionSource::StructuredMetadata, &DetectError::EmptyResult);
		return Detection::fallback();
	};

	for source in [
		DetectionSource::StructuredMetadata,
		DetectionSource::RawTag,
		DetectionSource::DisplayName,
		DetectionSource::Catalog,
	] {
		let attempt = match source {
			DetectionSource::StructuredMetadata => read_structured(result, &menu.item_id_tag),
			DetectionSource::RawTag => read_raw_tag(result, &menu.item_id_tag),
			DetectionSource::DisplayName => read_display_name(result, rules),
			DetectionSource::Catalog => read_catalog(view, result, rules, catalog),
			DetectionSource::Fallback => break,
		};
		match attempt {
			Ok(key) => return Detection { key, source },
			Err(err) => trace_stage(settings.debug, source, &err),
		}
	}
	Detection::fallback()
}

fn trace_stage(debug: bool, source: DetectionSource, err: &DetectError) {
	if debug {
		tracing::info!(stage = %source, reason = %err, "detection stage skipped");
	} else {
		tracing::debug!(stage = %source, reason = %err, "detection stage skipped");
	}
}

fn key_from(value: Option<&String>, tag: &str) -> Result<RecipeKey, DetectError> {
	value
		.and_then(|raw| RecipeKey::new(raw))
		.ok_or_else(|| DetectError::MissingTag { tag: tag.to_string() })
}

fn read_structured(item: &ItemSnapshot, tag: &str) -> Result<RecipeKey, DetectError> {
	match &item.structured {
		TagRead::Missing => Err(DetectError::Missing { layer: "structured" }),
		TagRead::Corrupt(reason) => Err(DetectError::Corrupt {
			layer: "structured",
			reason: reason.clone(),
		}),
		TagRead::Present(meta) if meta.item_type.is_none() => Err(DetectError::Untyped),
		TagRead::Present(meta) => key_from(meta.fields.get(tag), tag),
	}
}

fn read_raw_tag(item: &ItemSnapshot, tag: &str) -> Result<RecipeKey, DetectError> {
	match &item.raw_tags {
		TagRead::Missing => Err(DetectError::Missing { layer: "raw" }),
		TagRead::Corrupt(reason) => Err(DetectError::Corrupt {
			layer: "raw",
			reason: reason.clone(),
		}),
		TagRead::Present(tags) => key_from(tags.get(tag), tag),
	}
}

fn read_display_name(item: &ItemSnapshot, rules: &RuleSnapshot) -> Result<RecipeKey, DetectError> {
	let name = item
		.display_name
		.as_deref()
		.ok_or(DetectError::Missing { layer: "display name" })?;
	let candidate = strip_color_codes(name).split_whitespace().collect::<Vec<_>>().join("_");
	RecipeKey::new(&candidate)
		.filter(|key| !key.is_fallback() && rules.has_recipe(key))
		.ok_or(DetectError::NoDisplayMatch)
}

fn read_catalog(view: &dyn MenuView, result: &ItemSnapshot, rules: &RuleSnapshot, catalog: &RecipeCatalog) -> Result<RecipeKey, DetectError> {
	if catalog.is_empty() {
		return Err(DetectError::NoCatalogMatch);
	}
	let ingredients: Vec<String> = rules
		.mapping()
		.iter()
		.filter_map(|(_, slot)| view.item(slot))
		.map(|item| item.display_name.clone().unwrap_or_else(|| item.material.clone()))
		.collect();
	let result_name = result.display_name.as_deref().unwrap_or(&result.material);
	catalog
		.best_match(Some(result_name), &ingredients)
		.cloned()
		.ok_or(DetectError::NoCatalogMatch)
}

#[cfg(test)]
mod tests;
