//! Localized user-facing strings.
//!
//! Only strings that reach end users live here: validation feedback, the
//! exhaustion notice, and the labels printed on the back of a card.

use crate::preferences::Language;

/// Keys for localized strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    MissingRecipientEmail,
    MissingSenderName,
    InvalidEmail,
    MissingImages,
    MissingName,
    MissingEmail,
    MissingSubject,
    MissingMessage,
    MessageTooShort,
    CartEmpty,
    DefaultRecipientName,
    CardTitle,
    MessageLabel,
    ToLabel,
    FromLabel,
    PreviewUnavailable,
    PostcardSent,
    ContactSent,
}

impl Message {
    /// Text for this key in `language`.
    #[must_use]
    pub const fn text(self, language: Language) -> &'static str {
        match language {
            Language::Hr => self.hr(),
            Language::En => self.en(),
        }
    }

    const fn hr(self) -> &'static str {
        match self {
            Self::MissingRecipientEmail => "Email primatelja je obavezan",
            Self::MissingSenderName => "Vaše ime je obavezno",
            Self::InvalidEmail => "Molimo unesite valjanu email adresu",
            Self::MissingImages => "Nedostaju slike razglednice",
            Self::MissingName => "Ime je obavezno",
            Self::MissingEmail => "Email je obavezan",
            Self::MissingSubject => "Predmet je obavezan",
            Self::MissingMessage => "Poruka je obavezna",
            Self::MessageTooShort => "Poruka mora imati najmanje 10 znakova",
            Self::CartEmpty => "Košarica je prazna",
            Self::DefaultRecipientName => "Dragi prijatelj",
            Self::CardTitle => "Digitalna razglednica",
            Self::MessageLabel => "PORUKA:",
            Self::ToLabel => "PRIMA:",
            Self::FromLabel => "ŠALJE:",
            Self::PreviewUnavailable => "Pregled nije dostupan",
            Self::PostcardSent => "Razglednica je uspješno poslana!",
            Self::ContactSent => "Poruka je uspješno poslana!",
        }
    }

    const fn en(self) -> &'static str {
        match self {
            Self::MissingRecipientEmail => "Recipient email is required",
            Self::MissingSenderName => "Your name is required",
            Self::InvalidEmail => "Please enter a valid email address",
            Self::MissingImages => "Postcard images are missing",
            Self::MissingName => "Name is required",
            Self::MissingEmail => "Email is required",
            Self::MissingSubject => "Subject is required",
            Self::MissingMessage => "Message is required",
            Self::MessageTooShort => "Message must be at least 10 characters",
            Self::CartEmpty => "Your cart is empty",
            Self::DefaultRecipientName => "Dear friend",
            Self::CardTitle => "Digital postcard",
            Self::MessageLabel => "MESSAGE:",
            Self::ToLabel => "TO:",
            Self::FromLabel => "FROM:",
            Self::PreviewUnavailable => "Preview unavailable",
            Self::PostcardSent => "Postcard sent successfully!",
            Self::ContactSent => "Message sent successfully!",
        }
    }
}

/// Notice shown when every delivery transport has failed.
#[must_use]
pub fn delivery_exhausted(language: Language, support_contact: &str) -> String {
    match language {
        Language::Hr => format!(
            "Sve metode slanja razglednice su neuspješne. Molimo kontaktirajte podršku: {support_contact}"
        ),
        Language::En => format!(
            "All delivery methods failed. Please contact support: {support_contact}"
        ),
    }
}
