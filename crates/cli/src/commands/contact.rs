//! Contact message delivery.

use retropost_core::Language;
use retropost_core::messages::Message;
use retropost_server::config::RetroPostConfig;
use retropost_server::dispatch::{ContactRequest, Dispatcher};

use super::CommandResult;

/// Validate and deliver a contact message through the transport chain.
///
/// # Errors
///
/// Returns an error if configuration is missing, validation fails, or every
/// transport fails.
#[allow(clippy::print_stdout)]
pub async fn send(request: ContactRequest, language: Language) -> CommandResult {
    let config = RetroPostConfig::from_env()?;
    let dispatcher = Dispatcher::new(&config.delivery)?;

    let receipt = dispatcher.send_contact(request, language).await?;
    println!(
        "{} ({}, {} attempt(s))",
        Message::ContactSent.text(language),
        receipt.transport,
        receipt.attempts
    );
    Ok(())
}
