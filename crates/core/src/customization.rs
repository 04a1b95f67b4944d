//! Per-postcard personalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::HexColor;

/// Font family category for the front overlay text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Serif,
    Sans,
    Mono,
    Cursive,
}

impl FontFamily {
    pub const ALL: [Self; 4] = [Self::Serif, Self::Sans, Self::Mono, Self::Cursive];

    /// Lower-case identifier, also used as the font file stem.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serif => "serif",
            Self::Sans => "sans",
            Self::Mono => "mono",
            Self::Cursive => "cursive",
        }
    }
}

impl std::fmt::Display for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serif" => Ok(Self::Serif),
            "sans" | "sans-serif" => Ok(Self::Sans),
            "mono" | "monospace" => Ok(Self::Mono),
            "cursive" => Ok(Self::Cursive),
            _ => Err(format!("invalid font family: {s}")),
        }
    }
}

/// User-supplied personalization layered onto a template.
///
/// Field names serialize in camelCase to stay compatible with the browser
/// client's payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub front_text: String,
    #[serde(deserialize_with = "color_or_white")]
    pub front_text_color: HexColor,
    pub front_text_size: u32,
    pub front_text_font: FontFamily,
    pub message: String,
    pub signature: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub sender_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
}

impl Customization {
    pub const DEFAULT_FRONT_TEXT: &'static str = "Pozdrav iz prekrasnog mjesta!";
    pub const DEFAULT_TEXT_SIZE: u32 = 24;

    /// The message to deliver: the back message, or the front text when the
    /// message is blank.
    #[must_use]
    pub fn delivery_message(&self) -> &str {
        if self.message.trim().is_empty() {
            &self.front_text
        } else {
            &self.message
        }
    }
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            front_text: Self::DEFAULT_FRONT_TEXT.to_string(),
            front_text_color: HexColor::WHITE,
            front_text_size: Self::DEFAULT_TEXT_SIZE,
            front_text_font: FontFamily::Serif,
            message: String::new(),
            signature: String::new(),
            recipient_email: String::new(),
            recipient_name: String::new(),
            sender_name: String::new(),
            scheduled_date: None,
        }
    }
}

/// Unparsable colors render white instead of rejecting the whole record.
fn color_or_white<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HexColor, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(HexColor::parse_or_white(&raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Customization::default();
        assert_eq!(c.front_text, "Pozdrav iz prekrasnog mjesta!");
        assert_eq!(c.front_text_color, HexColor::WHITE);
        assert_eq!(c.front_text_size, 24);
        assert_eq!(c.front_text_font, FontFamily::Serif);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: Customization =
            serde_json::from_str(r##"{"frontText":"Bok!","frontTextColor":"#ef4444","frontTextFont":"mono"}"##)
                .unwrap();
        assert_eq!(c.front_text, "Bok!");
        assert_eq!(c.front_text_color, HexColor::rgb(0xef, 0x44, 0x44));
        assert_eq!(c.front_text_font, FontFamily::Mono);
        assert_eq!(c.front_text_size, 24);
    }

    #[test]
    fn test_unparsable_color_is_white() {
        let c: Customization = serde_json::from_str(r#"{"frontTextColor":"crvena"}"#).unwrap();
        assert_eq!(c.front_text_color, HexColor::WHITE);
    }

    #[test]
    fn test_delivery_message_falls_back_to_front_text() {
        let mut c = Customization::default();
        assert_eq!(c.delivery_message(), "Pozdrav iz prekrasnog mjesta!");
        c.message = "Vidimo se!".to_string();
        assert_eq!(c.delivery_message(), "Vidimo se!");
    }

    #[test]
    fn test_font_family_from_str() {
        assert_eq!("sans-serif".parse::<FontFamily>(), Ok(FontFamily::Sans));
        assert!("comic".parse::<FontFamily>().is_err());
    }
}
