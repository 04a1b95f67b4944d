//! Delivery requests and their validation.

use retropost_core::messages::Message;
use retropost_core::{Customization, Email, EmailError, Language};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compositor::RenderedPair;

/// Minimum length of a contact message after trimming.
pub const MIN_CONTACT_MESSAGE_CHARS: usize = 10;

/// Input rejected before any transport is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("recipient email is required")]
    MissingRecipientEmail,
    #[error("sender name is required")]
    MissingSenderName,
    #[error("email address is malformed")]
    InvalidEmail,
    #[error("postcard images are missing")]
    MissingImages,
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
    #[error("subject is required")]
    MissingSubject,
    #[error("message is required")]
    MissingMessage,
    #[error("message is shorter than {MIN_CONTACT_MESSAGE_CHARS} characters")]
    MessageTooShort,
}

impl ValidationError {
    /// User-facing text in `language`.
    #[must_use]
    pub const fn localized(self, language: Language) -> &'static str {
        let key = match self {
            Self::MissingRecipientEmail => Message::MissingRecipientEmail,
            Self::MissingSenderName => Message::MissingSenderName,
            Self::InvalidEmail => Message::InvalidEmail,
            Self::MissingImages => Message::MissingImages,
            Self::MissingName => Message::MissingName,
            Self::MissingEmail => Message::MissingEmail,
            Self::MissingSubject => Message::MissingSubject,
            Self::MissingMessage => Message::MissingMessage,
            Self::MessageTooShort => Message::MessageTooShort,
        };
        key.text(language)
    }
}

/// Postcard delivery request as received on the wire.
///
/// This is also the body of the hosted function's `/send-postcard`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostcardRequest {
    pub recipient_email: String,
    pub recipient_name: String,
    pub sender_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_image_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_image_data: Option<String>,
}

impl PostcardRequest {
    /// Request addressed by `customization`, without images yet.
    #[must_use]
    pub fn addressed(customization: &Customization) -> Self {
        Self {
            recipient_email: customization.recipient_email.clone(),
            recipient_name: customization.recipient_name.clone(),
            sender_name: customization.sender_name.clone(),
            message: customization.delivery_message().to_string(),
            front_image_data: None,
            back_image_data: None,
        }
    }

    /// Request for a rendered postcard addressed by its customization.
    #[must_use]
    pub fn for_rendered(customization: &Customization, images: &RenderedPair) -> Self {
        Self {
            front_image_data: Some(images.front.clone()),
            back_image_data: Some(images.back.clone()),
            ..Self::addressed(customization)
        }
    }

    /// Check the recipient and sender only, so a postcard can be rejected
    /// before its faces are rendered.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn check_addressing(&self) -> Result<(), ValidationError> {
        self.check_required()?;
        self.recipient()?;
        Ok(())
    }

    /// Check required fields, then the images, then the email shape.
    ///
    /// A blank recipient name becomes the localized default greeting.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(self, language: Language) -> Result<Postcard, ValidationError> {
        self.check_required()?;
        let has_image =
            |data: &Option<String>| data.as_deref().is_some_and(|d| !d.trim().is_empty());
        if !has_image(&self.front_image_data) || !has_image(&self.back_image_data) {
            return Err(ValidationError::MissingImages);
        }
        let recipient_email = self.recipient()?;

        let recipient_name = match self.recipient_name.trim() {
            "" => Message::DefaultRecipientName.text(language).to_string(),
            name => name.to_string(),
        };

        Ok(Postcard {
            recipient_email,
            recipient_name,
            sender_name: self.sender_name.trim().to_string(),
            message: self.message.trim().to_string(),
            front_image: self.front_image_data.unwrap_or_default(),
            back_image: self.back_image_data.unwrap_or_default(),
        })
    }

    fn check_required(&self) -> Result<(), ValidationError> {
        if self.recipient_email.trim().is_empty() {
            return Err(ValidationError::MissingRecipientEmail);
        }
        if self.sender_name.trim().is_empty() {
            return Err(ValidationError::MissingSenderName);
        }
        Ok(())
    }

    fn recipient(&self) -> Result<Email, ValidationError> {
        Email::parse(self.recipient_email.trim()).map_err(|_| ValidationError::InvalidEmail)
    }
}

/// A validated postcard ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postcard {
    pub recipient_email: Email,
    pub recipient_name: String,
    pub sender_name: String,
    /// May be empty; delivery substitutes the default greeting.
    pub message: String,
    pub front_image: String,
    pub back_image: String,
}

impl Postcard {
    /// Greeting used when the sender wrote no message.
    pub const DEFAULT_MESSAGE: &'static str = "Pozdrav iz prekrasnog mjesta!";

    /// The message body, or the default greeting.
    #[must_use]
    pub fn message_or_default(&self) -> &str {
        if self.message.is_empty() {
            Self::DEFAULT_MESSAGE
        } else {
            &self.message
        }
    }

    /// Back into the wire shape.
    #[must_use]
    pub fn to_request(&self) -> PostcardRequest {
        PostcardRequest {
            recipient_email: self.recipient_email.to_string(),
            recipient_name: self.recipient_name.clone(),
            sender_name: self.sender_name.clone(),
            message: self.message.clone(),
            front_image_data: Some(self.front_image.clone()),
            back_image_data: Some(self.back_image.clone()),
        }
    }
}

/// Contact form submission as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactRequest {
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(self) -> Result<ContactMessage, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let email = Email::parse(self.email.trim()).map_err(|e| match e {
            EmailError::Empty => ValidationError::MissingEmail,
            _ => ValidationError::InvalidEmail,
        })?;
        let subject = self.subject.trim();
        if subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        let message = self.message.trim();
        if message.is_empty() {
            return Err(ValidationError::MissingMessage);
        }
        if message.chars().count() < MIN_CONTACT_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooShort);
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email,
            subject: subject.to_string(),
            message: message.to_string(),
        })
    }
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Back into the wire shape.
    #[must_use]
    pub fn to_request(&self) -> ContactRequest {
        ContactRequest {
            name: self.name.clone(),
            email: self.email.to_string(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        }
    }
}

/// What a transport carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Postcard(Postcard),
    Contact(ContactMessage),
}

impl Envelope {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postcard(_) => "postcard",
            Self::Contact(_) => "contact",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn postcard() -> PostcardRequest {
        PostcardRequest {
            recipient_email: "a@b.com".to_string(),
            recipient_name: "Ana".to_string(),
            sender_name: "Ivo".to_string(),
            message: "Pozdrav!".to_string(),
            front_image_data: Some("data:image/jpeg;base64,AAAA".to_string()),
            back_image_data: Some("data:image/jpeg;base64,BBBB".to_string()),
        }
    }

    #[test]
    fn test_valid_postcard() {
        let card = postcard().validate(Language::Hr).unwrap();
        assert_eq!(card.recipient_email.as_str(), "a@b.com");
        assert_eq!(card.sender_name, "Ivo");
        assert_eq!(card.message_or_default(), "Pozdrav!");
    }

    #[test]
    fn test_postcard_validation_order() {
        let err = PostcardRequest {
            recipient_email: String::new(),
            sender_name: String::new(),
            ..postcard()
        }
        .validate(Language::Hr)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingRecipientEmail);

        let err = PostcardRequest {
            sender_name: "   ".to_string(),
            ..postcard()
        }
        .validate(Language::Hr)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingSenderName);

        let err = PostcardRequest {
            recipient_email: "not-an-email".to_string(),
            ..postcard()
        }
        .validate(Language::Hr)
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail);

        let err = PostcardRequest {
            back_image_data: None,
            ..postcard()
        }
        .validate(Language::Hr)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingImages);

        // Missing images are reported before a malformed email.
        let err = PostcardRequest {
            recipient_email: "not-an-email".to_string(),
            front_image_data: None,
            ..postcard()
        }
        .validate(Language::Hr)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingImages);
    }

    #[test]
    fn test_check_addressing_ignores_images() {
        let unrendered = PostcardRequest {
            front_image_data: None,
            back_image_data: None,
            ..postcard()
        };
        assert_eq!(unrendered.check_addressing(), Ok(()));

        let bad = PostcardRequest {
            recipient_email: "not-an-email".to_string(),
            ..unrendered.clone()
        };
        assert_eq!(bad.check_addressing(), Err(ValidationError::InvalidEmail));

        let anonymous = PostcardRequest {
            sender_name: String::new(),
            ..unrendered
        };
        assert_eq!(anonymous.check_addressing(), Err(ValidationError::MissingSenderName));
    }

    #[test]
    fn test_default_recipient_name() {
        let request = PostcardRequest {
            recipient_name: " ".to_string(),
            ..postcard()
        };
        assert_eq!(
            request.clone().validate(Language::Hr).unwrap().recipient_name,
            "Dragi prijatelj"
        );
        assert_eq!(
            request.validate(Language::En).unwrap().recipient_name,
            "Dear friend"
        );
    }

    #[test]
    fn test_for_rendered_uses_front_text_without_message() {
        let customization = Customization {
            front_text: "Pozdrav s mora".to_string(),
            recipient_email: "a@b.com".to_string(),
            sender_name: "Ivo".to_string(),
            ..Customization::default()
        };
        let images = RenderedPair {
            front: "data:image/jpeg;base64,AAAA".to_string(),
            back: "data:image/jpeg;base64,BBBB".to_string(),
        };

        let request = PostcardRequest::for_rendered(&customization, &images);
        assert_eq!(request.message, "Pozdrav s mora");
        assert_eq!(request.back_image_data.as_deref(), Some("data:image/jpeg;base64,BBBB"));
        assert!(request.validate(Language::Hr).is_ok());
    }

    #[test]
    fn test_empty_message_uses_default() {
        let card = PostcardRequest {
            message: String::new(),
            ..postcard()
        }
        .validate(Language::Hr)
        .unwrap();
        assert_eq!(card.message_or_default(), Postcard::DEFAULT_MESSAGE);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(postcard()).unwrap();
        assert_eq!(json["recipientEmail"], "a@b.com");
        assert_eq!(json["frontImageData"], "data:image/jpeg;base64,AAAA");

        let parsed: PostcardRequest =
            serde_json::from_str(r#"{"recipientEmail":"x@y.hr","senderName":"Ivo"}"#).unwrap();
        assert_eq!(parsed.recipient_email, "x@y.hr");
        assert!(parsed.front_image_data.is_none());
    }

    #[test]
    fn test_contact_validation() {
        let valid = ContactRequest {
            name: "Marko".to_string(),
            email: "marko@example.hr".to_string(),
            subject: "Upit".to_string(),
            message: "Zanima me cijena razglednica.".to_string(),
        };
        assert!(valid.clone().validate().is_ok());

        let cases = [
            (
                ContactRequest { name: String::new(), ..valid.clone() },
                ValidationError::MissingName,
            ),
            (
                ContactRequest { email: String::new(), ..valid.clone() },
                ValidationError::MissingEmail,
            ),
            (
                ContactRequest { email: "marko".to_string(), ..valid.clone() },
                ValidationError::InvalidEmail,
            ),
            (
                ContactRequest { subject: " ".to_string(), ..valid.clone() },
                ValidationError::MissingSubject,
            ),
            (
                ContactRequest { message: String::new(), ..valid.clone() },
                ValidationError::MissingMessage,
            ),
            (
                ContactRequest { message: "  kratko  ".to_string(), ..valid },
                ValidationError::MessageTooShort,
            ),
        ];
        for (request, expected) in cases {
            assert_eq!(request.validate().unwrap_err(), expected);
        }
    }

    #[test]
    fn test_localized_messages() {
        assert_eq!(
            ValidationError::InvalidEmail.localized(Language::En),
            "Please enter a valid email address"
        );
        assert_eq!(
            ValidationError::MissingSenderName.localized(Language::Hr),
            "Vaše ime je obavezno"
        );
    }
}
