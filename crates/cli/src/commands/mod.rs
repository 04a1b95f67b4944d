//! Subcommand implementations.

pub mod cart;
pub mod contact;
pub mod postcard;
pub mod prefs;
pub mod templates;

use clap::Args;
use retropost_core::{Customization, FontFamily, HexColor};

/// Boxed error used by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Personalization flags shared by `render`, `send` and `cart add`.
#[derive(Debug, Clone, Default, Args)]
pub struct CustomizationArgs {
    /// Text drawn on the front
    #[arg(long)]
    pub text: Option<String>,

    /// Front text color (`#rrggbb`)
    #[arg(long)]
    pub color: Option<HexColor>,

    /// Front text size in pixels
    #[arg(long)]
    pub size: Option<u32>,

    /// Front font (serif, sans, mono, cursive)
    #[arg(long)]
    pub font: Option<FontFamily>,

    /// Message on the back
    #[arg(short, long)]
    pub message: Option<String>,

    /// Signature on the back
    #[arg(long)]
    pub signature: Option<String>,
}

impl CustomizationArgs {
    /// Apply the flags over the defaults.
    #[must_use]
    pub fn into_customization(self) -> Customization {
        let defaults = Customization::default();
        Customization {
            front_text: self.text.unwrap_or(defaults.front_text),
            front_text_color: self.color.unwrap_or(defaults.front_text_color),
            front_text_size: self.size.unwrap_or(defaults.front_text_size),
            front_text_font: self.font.unwrap_or(defaults.front_text_font),
            message: self.message.unwrap_or_default(),
            signature: self.signature.unwrap_or_default(),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let customization = CustomizationArgs {
            text: Some("Pozdrav s Hvara".to_string()),
            size: Some(40),
            font: Some(FontFamily::Mono),
            ..CustomizationArgs::default()
        }
        .into_customization();

        assert_eq!(customization.front_text, "Pozdrav s Hvara");
        assert_eq!(customization.front_text_size, 40);
        assert_eq!(customization.front_text_font, FontFamily::Mono);
        assert_eq!(customization.front_text_color, HexColor::WHITE);
        assert!(customization.message.is_empty());
    }
}
