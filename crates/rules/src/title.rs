use crafthook_config::ConfigWarning;
use crafthook_primitives::text::strip_color_codes;
use regex::{Regex, RegexBuilder};

/// Compiled menu title recognition patterns.
///
/// Patterns match case-insensitively anywhere in the colour-stripped title.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
	sources: Vec<String>,
	compiled: Vec<Regex>,
}

impl TitleMatcher {
	/// Compiles `patterns`. A pattern that is not a valid regex is matched as
	/// a literal instead and reported.
	pub fn compile(patterns: &[String], warnings: &mut Vec<ConfigWarning>) -> Self {
		let mut compiled = Vec::with_capacity(patterns.len());
		for pattern in patterns {
			match case_insensitive(pattern) {
				Ok(re) => compiled.push(re),
				Err(err) => {
					warnings.push(ConfigWarning::InvalidTitlePattern {
						pattern: pattern.clone(),
						error: err.to_string(),
					});
					match case_insensitive(&regex::escape(pattern)) {
						Ok(re) => compiled.push(re),
						Err(err) => tracing::warn!(pattern, error = %err, "title pattern dropped"),
					}
				}
			}
		}
		Self {
			sources: patterns.to_vec(),
			compiled,
		}
	}

	/// Tests a raw title, formatting codes included.
	pub fn matches(&self, raw_title: &str) -> bool {
		let title = strip_color_codes(raw_title);
		self.compiled.iter().any(|re| re.is_match(&title))
	}

	/// Patterns as configured.
	pub fn patterns(&self) -> &[String] {
		&self.sources
	}
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
	RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_pattern_matches_coloured_mixed_case_title() {
		let matcher = TitleMatcher::compile(&["chế tạo".to_string()], &mut Vec::new());
		assert!(matcher.matches("§6§lChế Tạo §r- Kiếm"));
		assert!(matcher.matches("BẢNG CHẾ TẠO"));
		assert!(!matcher.matches("Kho đồ"));
	}

	#[test]
	fn invalid_regex_falls_back_to_literal() {
		let mut warnings = Vec::new();
		let matcher = TitleMatcher::compile(&["forge (".to_string()], &mut warnings);
		assert!(matcher.matches("Dwarven Forge (II)"));
		assert!(!matcher.matches("Dwarven Forge"));
		assert!(matches!(&warnings[..], [ConfigWarning::InvalidTitlePattern { pattern, .. }] if pattern == "forge ("));
	}

	#[test]
	fn regex_patterns_are_honoured() {
		let matcher = TitleMatcher::compile(&["^craft(ing)? table$".to_string()], &mut Vec::new());
		assert!(matcher.matches("Crafting Table"));
		assert!(!matcher.matches("My Crafting Table"));
	}
}
