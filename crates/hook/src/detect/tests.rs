use crafthook_config::{ConfigDocument, HookConfig};
use crafthook_primitives::{MenuSnapshot, Slot};
use pretty_assertions::assert_eq;

use super::*;

fn rules(toml: &str) -> RuleSnapshot {
	let config = HookConfig::from_document(&ConfigDocument::from_toml_str(toml).unwrap()).unwrap();
	RuleSnapshot::build(1, &config, &mut Vec::new())
}

fn default_rules() -> RuleSnapshot {
	rules(
		r#"
		[items-command.IRON_SWORD]
		"1" = "say iron"
		[items-command.SWORD01]
		"1" = "say sword"
		"#,
	)
}

fn key(raw: &str) -> RecipeKey {
	RecipeKey::new(raw).unwrap()
}

fn menu_with_result(item: ItemSnapshot) -> MenuSnapshot {
	MenuSnapshot::new("Chế tạo").with_item(25, item)
}

#[test]
fn structured_metadata_wins() {
	let item = ItemSnapshot::new("DIAMOND_SWORD")
		.with_structured("SWORD", [("MMOITEMS_ITEM_ID", " sword01 ")])
		.with_raw_tag("MMOITEMS_ITEM_ID", "OTHER");
	let detection = detect_recipe(&menu_with_result(item), &default_rules(), &RecipeCatalog::default());
	assert_eq!(
		detection,
		Detection {
			key: key("SWORD01"),
			source: DetectionSource::StructuredMetadata,
		}
	);
}

#[test]
fn corrupt_or_untyped_metadata_falls_through_to_raw_tag() {
	let corrupt = ItemSnapshot::new("DIAMOND_SWORD")
		.with_corrupt_structured("bad nbt")
		.with_raw_tag("MMOITEMS_ITEM_ID", "axe02");
	let detection = detect_recipe(&menu_with_result(corrupt), &default_rules(), &RecipeCatalog::default());
	assert_eq!(detection.key, key("AXE02"));
	assert_eq!(detection.source, DetectionSource::RawTag);

	let mut untyped = ItemSnapshot::new("STICK").with_raw_tag("MMOITEMS_ITEM_ID", "bow");
	untyped.structured = TagRead::Present(Default::default());
	let detection = detect_recipe(&menu_with_result(untyped), &default_rules(), &RecipeCatalog::default());
	assert_eq!(detection.source, DetectionSource::RawTag);
	assert_eq!(detection.key, key("BOW"));
}

#[test]
fn configured_item_id_tag_is_used() {
	let snapshot = rules(
		r#"
		[menu-detection]
		item-id-tag = "ITEM_ID"
		"#,
	);
	let item = ItemSnapshot::new("BOW")
		.with_raw_tag("MMOITEMS_ITEM_ID", "WRONG")
		.with_raw_tag("ITEM_ID", "longbow");
	let detection = detect_recipe(&menu_with_result(item), &snapshot, &RecipeCatalog::default());
	assert_eq!(detection.key, key("LONGBOW"));
}

#[test]
fn display_name_matches_only_configured_recipes() {
	let named = ItemSnapshot::new("IRON_SWORD").with_display_name("§fIron  Sword");
	let detection = detect_recipe(&menu_with_result(named), &default_rules(), &RecipeCatalog::default());
	assert_eq!(
		detection,
		Detection {
			key: key("IRON_SWORD"),
			source: DetectionSource::DisplayName,
		}
	);

	let unknown = ItemSnapshot::new("STONE").with_display_name("§7Pebble");
	let detection = detect_recipe(&menu_with_result(unknown), &default_rules(), &RecipeCatalog::default());
	assert_eq!(detection, Detection::fallback());
}

#[test]
fn empty_result_slot_uses_fallback() {
	let detection = detect_recipe(&MenuSnapshot::new("Chế tạo"), &default_rules(), &RecipeCatalog::default());
	assert_eq!(detection, Detection::fallback());
	assert!(detection.key.is_fallback());
}

#[test]
fn catalog_is_last_resort() {
	let catalog = RecipeCatalog::new([CatalogRecipe::new(key("HELM"), "Steel Helm", ["Steel Ingot"])]);
	let menu = menu_with_result(ItemSnapshot::new("IRON_HELMET").with_display_name("§bSteel Helm"))
		.with_item(10, ItemSnapshot::new("IRON_INGOT").with_display_name("Steel Ingot"));
	let detection = detect_recipe(&menu, &default_rules(), &catalog);
	assert_eq!(
		detection,
		Detection {
			key: key("HELM"),
			source: DetectionSource::Catalog,
		}
	);

	let tagged = menu.clone().with_item(25, ItemSnapshot::new("IRON_HELMET").with_raw_tag("MMOITEMS_ITEM_ID", "x"));
	assert_eq!(detect_recipe(&tagged, &default_rules(), &catalog).source, DetectionSource::RawTag);
}

#[test]
fn catalog_ranks_result_name_then_ingredients_then_overlaps() {
	let catalog = RecipeCatalog::new([
		CatalogRecipe::new(key("OVERLAP"), "Great Blade of Doom", ["iron"]),
		CatalogRecipe::new(key("INGREDIENTS"), "Something", ["Iron Ingot", "Oak Stick"]),
		CatalogRecipe::new(key("RESULT"), "Blade", Vec::<String>::new()),
	]);
	let observed = vec!["iron ingot".to_string(), "oak stick".to_string()];

	assert_eq!(catalog.best_match(Some("§aBlade"), &observed), Some(&key("RESULT")));
	assert_eq!(catalog.best_match(Some("Dagger"), &observed), Some(&key("INGREDIENTS")));
	assert_eq!(catalog.best_match(Some("Blade of Doom"), &[]), Some(&key("OVERLAP")));
	assert_eq!(catalog.best_match(Some("Nothing"), &["dirt".to_string()]), None);
}

#[test]
fn catalog_ties_go_to_lowest_key() {
	let catalog = RecipeCatalog::new([
		CatalogRecipe::new(key("ZETA"), "Blade", ["iron"]),
		CatalogRecipe::new(key("ALPHA"), "Blade", ["iron"]),
		CatalogRecipe::new(key("MID"), "Blade", ["iron"]),
	]);
	assert_eq!(catalog.best_match(Some("Blade"), &["Iron".to_string()]), Some(&key("ALPHA")));
}

#[test]
fn indicator_requires_matching_model_data() {
	let settings = default_rules();
	let menu = &settings.settings().menu;

	let marked = MenuSnapshot::new("x").with_item(34, ItemSnapshot::new("PAPER").with_model_data(10004));
	assert!(indicator_valid(&marked, menu));

	let wrong = MenuSnapshot::new("x").with_item(34, ItemSnapshot::new("PAPER").with_model_data(10005));
	assert!(!indicator_valid(&wrong, menu));

	let elsewhere = MenuSnapshot::new("x").with_item(Slot(33), ItemSnapshot::new("PAPER").with_model_data(10004));
	assert!(!indicator_valid(&elsewhere, menu));
	assert!(!indicator_valid(&MenuSnapshot::new("x"), menu));
}
