//! Resolution of multi-language text maps.

use crate::LocalizedText;

/// Picks the best translation from a localized text map.
///
/// Tries the requested language, then the fallback (default) language, then
/// the first non-empty translation in code order.
pub fn resolve_text<'a>(text: &'a LocalizedText, lang: &str, fallback: &str) -> Option<&'a str> {
	let non_empty = |code: &str| {
		text.get(code)
			.map(String::as_str)
			.filter(|value| !value.trim().is_empty())
	};

	non_empty(lang)
		.or_else(|| non_empty(fallback))
		.or_else(|| {
			text.values()
				.map(String::as_str)
				.find(|value| !value.trim().is_empty())
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn text(pairs: &[(&str, &str)]) -> LocalizedText {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn test_prefers_requested_language() {
		let name = text(&[("en", "Soup"), ("tr", "Çorba")]);
		assert_eq!(resolve_text(&name, "tr", "en"), Some("Çorba"));
	}

	#[test]
	fn test_falls_back_to_default_then_any() {
		let name = text(&[("de", "Suppe"), ("en", "Soup"), ("tr", "  ")]);
		assert_eq!(resolve_text(&name, "tr", "en"), Some("Soup"));
		assert_eq!(resolve_text(&name, "fr", "it"), Some("Suppe"));
		assert_eq!(resolve_text(&LocalizedText::new(), "en", "en"), None);
	}
}
