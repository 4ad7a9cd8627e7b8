//! Site settings: editable key/value content for page copy and appearance.
//!
//! Every setting carries a typed value. The value is a tagged union rather
//! than a free-form JSON blob, so the admin form renderer and the pages
//! match on it exhaustively instead of sniffing a runtime type tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A typed setting value. The serialized form is `{"type": ..., "value": ...}`
/// flattened into the setting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SettingValue {
    /// Single-line text.
    Text(String),
    /// Multi-line text.
    #[serde(rename = "textarea")]
    TextArea(String),
    Number(f64),
    Boolean(bool),
    /// Hex color string, e.g. `"#8B9D83"`.
    Color(String),
}

impl SettingValue {
    /// Text payload for `Text` and `TextArea` values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::TextArea(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value for display, whatever its type.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) | Self::TextArea(s) | Self::Color(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

/// One site setting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Unique key, e.g. `hero_heading`.
    pub key: String,
    #[serde(flatten)]
    pub value: SettingValue,
    /// Grouping for the admin settings form (`general`, `home`, `about`...).
    pub group: String,
    /// Human label shown in the admin form.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Setting {
    #[must_use]
    pub fn new(key: &str, value: SettingValue, group: &str, label: &str) -> Self {
        Self {
            key: key.to_owned(),
            value,
            group: group.to_owned(),
            label: label.to_owned(),
            updated_at: Some(Utc::now()),
        }
    }
}

/// The settings every fresh install seeds. Keys and copy carried over from
/// the previous site.
#[must_use]
pub fn default_settings() -> Vec<Setting> {
    use SettingValue::{Color, Text, TextArea};

    vec![
        Setting::new(
            "site_title",
            Text("Nonna & Rue's".into()),
            "general",
            "Site Title",
        ),
        Setting::new(
            "site_description",
            TextArea("Unique Finds for Your Home".into()),
            "general",
            "Site Description",
        ),
        Setting::new(
            "footer_text",
            Text("All rights reserved.".into()),
            "general",
            "Footer Text",
        ),
        Setting::new(
            "primary_color",
            Color("#8B9D83".into()),
            "appearance",
            "Primary Color",
        ),
        Setting::new(
            "secondary_color",
            Color("#4A3D3D".into()),
            "appearance",
            "Secondary Color",
        ),
        Setting::new(
            "hero_heading",
            Text("Discover Unique Treasures".into()),
            "home",
            "Hero Heading",
        ),
        Setting::new(
            "hero_subheading",
            Text("Curated vintage & handcrafted home goods with southern charm".into()),
            "home",
            "Hero Subheading",
        ),
        Setting::new(
            "contact_email",
            Text("contact@nonnaandrues.com".into()),
            "contact",
            "Contact Email",
        ),
        Setting::new(
            "contact_phone",
            Text("(318) 555-1234".into()),
            "contact",
            "Contact Phone",
        ),
        Setting::new(
            "about_header",
            Text("Our Story".into()),
            "about",
            "About Page Header",
        ),
        Setting::new(
            "about_subheader",
            Text("A mother-daughter journey of passion, creativity, and Southern hospitality".into()),
            "about",
            "About Page Subheader",
        ),
        Setting::new(
            "about_text",
            TextArea(
                "Nonna & Rue's began as a dream shared between a mother and daughter in the \
                 heart of Shreveport, Louisiana. Rhonda \"Nonna\" and her daughter Lauren \
                 \"Rue\" always shared a special bond through their love of unique, \
                 handcrafted treasures."
                    .into(),
            ),
            "about",
            "About Us First Paragraph",
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn value_tag_flattens_into_document() {
        let setting = Setting::new(
            "primary_color",
            SettingValue::Color("#8B9D83".into()),
            "appearance",
            "Primary Color",
        );
        let json = serde_json::to_value(&setting).unwrap();
        assert_eq!(json["type"], "color");
        assert_eq!(json["value"], "#8B9D83");
        assert_eq!(json["key"], "primary_color");
    }

    #[test]
    fn textarea_uses_its_own_tag() {
        let value = SettingValue::TextArea("long copy".into());
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "textarea");
    }

    #[test]
    fn round_trips_every_variant() {
        let values = [
            SettingValue::Text("a".into()),
            SettingValue::TextArea("b".into()),
            SettingValue::Number(4.0),
            SettingValue::Boolean(true),
            SettingValue::Color("#fff".into()),
        ];
        for value in values {
            let json = serde_json::to_string(&value).unwrap();
            let back: SettingValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn default_settings_have_unique_keys() {
        let settings = default_settings();
        let mut keys: Vec<&str> = settings.iter().map(|s| s.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), settings.len());
    }

    #[test]
    fn typed_accessors_match_variants() {
        assert_eq!(SettingValue::Text("hi".into()).as_text(), Some("hi"));
        assert_eq!(SettingValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(SettingValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(SettingValue::Color("#fff".into()).as_text(), None);
    }
}
