//! Services used by the HTTP handlers.
//!
//! # Services
//!
//! - `mailer` - Delivery behind the hosted postcard function (SMTP or relay)

pub mod mailer;

pub use mailer::{Mailer, MailerError};
