//! The restaurant settings record.
//!
//! Settings are a single flat record controlling branding, UI toggles of the
//! public menu and displays, and QR code styling. `Settings::default()` is
//! the defaults object that a reset restores verbatim.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error correction level encoded into table QR codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrErrorCorrection {
	L,
	#[default]
	M,
	Q,
	H,
}

/// Module shape used when rendering QR codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrDotStyle {
	#[default]
	Square,
	Rounded,
	Dots,
}

/// Flat settings record. Unknown keys are rejected on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
	// Branding
	pub restaurant_name: String,
	pub restaurant_description: String,
	pub logo_url: Option<String>,
	pub primary_color: String,
	pub accent_color: String,
	pub contact_phone: Option<String>,
	pub contact_email: Option<String>,
	pub contact_address: Option<String>,
	pub opening_hours: Option<String>,
	pub footer_text: String,

	// Money
	pub currency: String,
	pub currency_symbol: String,
	/// Tax applied to orders, in percent.
	pub tax_rate: Decimal,

	// Localization
	pub default_language: String,

	// Public menu toggles
	pub show_prices: bool,
	pub show_images: bool,
	pub show_descriptions: bool,
	pub show_allergens: bool,
	pub show_food_types: bool,
	pub show_calories: bool,
	pub enable_ordering: bool,

	// Displays
	pub enable_kitchen_display: bool,
	pub enable_order_status_screen: bool,
	/// Seconds a ready order stays on the status screen; 0 keeps it until served.
	pub status_screen_ready_seconds: u64,

	// QR styling
	pub public_menu_base_url: String,
	pub qr_foreground_color: String,
	pub qr_background_color: String,
	pub qr_size: u32,
	pub qr_margin: u32,
	pub qr_error_correction: QrErrorCorrection,
	pub qr_dot_style: QrDotStyle,
	pub qr_include_logo: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			restaurant_name: "My Restaurant".to_string(),
			restaurant_description: String::new(),
			logo_url: None,
			primary_color: "#1F2937".to_string(),
			accent_color: "#F59E0B".to_string(),
			contact_phone: None,
			contact_email: None,
			contact_address: None,
			opening_hours: None,
			footer_text: String::new(),
			currency: "USD".to_string(),
			currency_symbol: "$".to_string(),
			tax_rate: Decimal::ZERO,
			default_language: "en".to_string(),
			show_prices: true,
			show_images: true,
			show_descriptions: true,
			show_allergens: true,
			show_food_types: true,
			show_calories: false,
			enable_ordering: true,
			enable_kitchen_display: true,
			enable_order_status_screen: true,
			status_screen_ready_seconds: 600,
			public_menu_base_url: "http://localhost:3000/menu".to_string(),
			qr_foreground_color: "#000000".to_string(),
			qr_background_color: "#FFFFFF".to_string(),
			qr_size: 256,
			qr_margin: 4,
			qr_error_correction: QrErrorCorrection::M,
			qr_dot_style: QrDotStyle::Square,
			qr_include_logo: false,
		}
	}
}

impl Settings {
	/// Checks value constraints that serde cannot express.
	pub fn validate(&self) -> Result<(), String> {
		if self.restaurant_name.trim().is_empty() {
			return Err("restaurant_name cannot be empty".into());
		}

		let color = Regex::new(r"^#[0-9A-Fa-f]{6}$").map_err(|e| format!("Regex error: {}", e))?;

		for (field, value) in [
			("primary_color", &self.primary_color),
			("accent_color", &self.accent_color),
			("qr_foreground_color", &self.qr_foreground_color),
			("qr_background_color", &self.qr_background_color),
		] {
			if !color.is_match(value) {
				return Err(format!("{} must be a #RRGGBB color, got '{}'", field, value));
			}
		}

		if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE_HUNDRED {
			return Err(format!("tax_rate must be within 0..=100, got {}", self.tax_rate));
		}
		if !(64..=2048).contains(&self.qr_size) {
			return Err(format!("qr_size must be within 64..=2048, got {}", self.qr_size));
		}
		if self.qr_margin > 64 {
			return Err(format!("qr_margin cannot exceed 64, got {}", self.qr_margin));
		}
		if self.currency.trim().is_empty() {
			return Err("currency cannot be empty".into());
		}
		if !(self.public_menu_base_url.starts_with("http://")
			|| self.public_menu_base_url.starts_with("https://"))
		{
			return Err("public_menu_base_url must be an http(s) URL".into());
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		assert!(Settings::default().validate().is_ok());
	}

	#[test]
	fn test_rejects_bad_values() {
		let bad_color = Settings {
			accent_color: "orange".into(),
			..Settings::default()
		};
		assert!(bad_color.validate().unwrap_err().contains("accent_color"));

		let bad_tax = Settings {
			tax_rate: Decimal::new(101, 0),
			..Settings::default()
		};
		assert!(bad_tax.validate().is_err());

		let bad_size = Settings {
			qr_size: 10,
			..Settings::default()
		};
		assert!(bad_size.validate().unwrap_err().contains("qr_size"));
	}

	#[test]
	fn test_unknown_keys_rejected() {
		let mut json = serde_json::to_value(Settings::default()).unwrap();
		json["show_wine_list"] = serde_json::json!(true);
		assert!(serde_json::from_value::<Settings>(json).is_err());
	}
}
