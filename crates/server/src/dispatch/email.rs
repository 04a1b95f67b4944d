//! Email bodies for postcards and contact messages.
//!
//! Rendered with Askama from `templates/email/`. Postcard images are
//! referenced either inline as `data:` URLs (relay delivery) or as
//! `cid:` parts (SMTP delivery).

use askama::Template;

use super::envelope::{ContactMessage, Postcard};

/// Site linked from the email footer.
pub const SITE_URL: &str = "https://retropost.app";

#[derive(Template)]
#[template(path = "email/postcard.html")]
struct PostcardEmailHtml<'a> {
    recipient_name: &'a str,
    sender_name: &'a str,
    message: &'a str,
    front_src: &'a str,
    back_src: &'a str,
    site_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/postcard.txt")]
struct PostcardEmailText<'a> {
    recipient_name: &'a str,
    sender_name: &'a str,
    message: &'a str,
    site_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmailHtml<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactEmailText<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Where the HTML body finds the two faces.
#[derive(Debug, Clone, Copy)]
pub enum ImageRefs<'a> {
    /// Embed the `data:` URLs directly.
    Inline,
    /// Reference MIME parts by content id.
    ContentIds { front: &'a str, back: &'a str },
}

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Subject line for a postcard.
#[must_use]
pub fn postcard_subject(postcard: &Postcard) -> String {
    format!(
        "Nova razglednica od {} za {}",
        postcard.sender_name, postcard.recipient_name
    )
}

/// Render the postcard email.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn postcard_email(postcard: &Postcard, images: ImageRefs<'_>) -> Result<RenderedEmail, askama::Error> {
    let (front_src, back_src) = match images {
        ImageRefs::Inline => (postcard.front_image.clone(), postcard.back_image.clone()),
        ImageRefs::ContentIds { front, back } => (format!("cid:{front}"), format!("cid:{back}")),
    };
    let message = postcard.message_or_default();

    let html = PostcardEmailHtml {
        recipient_name: &postcard.recipient_name,
        sender_name: &postcard.sender_name,
        message,
        front_src: &front_src,
        back_src: &back_src,
        site_url: SITE_URL,
    }
    .render()?;
    let text = PostcardEmailText {
        recipient_name: &postcard.recipient_name,
        sender_name: &postcard.sender_name,
        message,
        site_url: SITE_URL,
    }
    .render()?;

    Ok(RenderedEmail {
        subject: postcard_subject(postcard),
        html,
        text,
    })
}

/// Render the contact email.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn contact_email(contact: &ContactMessage) -> Result<RenderedEmail, askama::Error> {
    let email = contact.email.as_str();
    let html = ContactEmailHtml {
        name: &contact.name,
        email,
        subject: &contact.subject,
        message: &contact.message,
    }
    .render()?;
    let text = ContactEmailText {
        name: &contact.name,
        email,
        subject: &contact.subject,
        message: &contact.message,
    }
    .render()?;

    Ok(RenderedEmail {
        subject: format!("RetroPost kontakt: {}", contact.subject),
        html,
        text,
    })
}
