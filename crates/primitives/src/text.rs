//! Helpers for the `§`-prefixed legacy formatting codes used in menu titles,
//! item names and chat messages.

/// The section sign that introduces a formatting code.
pub const SECTION: char = '\u{00A7}';

fn is_format_code(c: char) -> bool {
	matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r' | 'x')
}

/// Removes `§x` formatting pairs from `input`.
pub fn strip_color_codes(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut chars = input.chars().peekable();
	while let Some(c) = chars.next() {
		if c == SECTION && chars.peek().is_some_and(|&next| is_format_code(next)) {
			chars.next();
			continue;
		}
		out.push(c);
	}
	out
}

/// Rewrites `alt`-prefixed codes (usually `&`) into `§` codes.
///
/// Only pairs whose second character is a valid code are rewritten, so a
/// literal `"rock & roll"` survives unchanged. Code characters are lower-cased.
pub fn translate_color_codes(alt: char, input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut chars = input.chars().peekable();
	while let Some(c) = chars.next() {
		if c == alt
			&& let Some(&next) = chars.peek()
			&& is_format_code(next)
		{
			out.push(SECTION);
			out.push(next.to_ascii_lowercase());
			chars.next();
			continue;
		}
		out.push(c);
	}
	out
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	proptest! {
		#[test]
		fn text_without_markers_is_untouched(input in "[^&\u{00A7}]{0,40}") {
			prop_assert_eq!(translate_color_codes('&', &input), input.clone());
			prop_assert_eq!(strip_color_codes(&input), input);
		}
	}

	#[test]
	fn strip_removes_only_valid_pairs() {
		assert_eq!(strip_color_codes("§6§lChế Tạo §rItem"), "Chế Tạo Item");
		assert_eq!(strip_color_codes("100§ sure"), "100§ sure");
	}

	#[test]
	fn translate_rewrites_ampersand_codes() {
		assert_eq!(translate_color_codes('&', "&aHello &LWorld"), "§aHello §lWorld");
		assert_eq!(translate_color_codes('&', "rock & roll"), "rock & roll");
		assert_eq!(translate_color_codes('&', "trailing &"), "trailing &");
	}
}
