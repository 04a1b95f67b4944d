//! Local cart, checkout and order history.

use retropost_core::messages::Message;
use retropost_core::{
    CartError, CartItem, CartItemId, Customization, CustomerInfo, Email, Language, Order, OrderId,
    Template,
};

use super::CommandResult;
use crate::store::LocalStore;

/// One line per cart item.
#[must_use]
pub fn format_item(item: &CartItem) -> String {
    format!(
        "{}  {} x{}  {}",
        item.id,
        item.template.name,
        item.quantity,
        item.line_total()
    )
}

/// Add a postcard, with its rendered faces when given.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
#[allow(clippy::print_stdout)]
pub fn add(
    store: &mut LocalStore,
    template: Template,
    customization: Customization,
    images: Option<(String, String)>,
) -> CommandResult {
    let mut cart = store.cart();
    let (front, back) = images.unzip();
    let item = cart.add(template, customization, front, back);
    println!("{}", format_item(item));
    store.save_cart(&cart)?;
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn list(store: &LocalStore, language: Language) {
    let cart = store.cart();
    if cart.is_empty() {
        println!("{}", Message::CartEmpty.text(language));
        return;
    }
    for item in cart.items() {
        println!("{}", format_item(item));
    }
    println!("{} ({})", cart.total(), cart.item_count());
}

/// # Errors
///
/// Returns an error if the item is unknown or the store cannot be written.
pub fn remove(store: &mut LocalStore, id: &str) -> CommandResult {
    let mut cart = store.cart();
    if !cart.remove(&CartItemId::new(id)) {
        return Err(format!("no cart item {id}").into());
    }
    store.save_cart(&cart)?;
    Ok(())
}

/// Set an item's quantity; zero removes it.
///
/// # Errors
///
/// Returns an error if the item is unknown or the store cannot be written.
pub fn quantity(store: &mut LocalStore, id: &str, quantity: u32) -> CommandResult {
    let mut cart = store.cart();
    if !cart.update_quantity(&CartItemId::new(id), quantity) {
        return Err(format!("no cart item {id}").into());
    }
    store.save_cart(&cart)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn clear(store: &mut LocalStore) -> CommandResult {
    let mut cart = store.cart();
    cart.clear();
    store.save_cart(&cart)?;
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn total(store: &LocalStore) {
    let cart = store.cart();
    println!("{}", cart.total());
}

/// Turn the cart into a pending order.
///
/// # Errors
///
/// Returns an error if the cart is empty, the email is invalid, or the store
/// cannot be written.
#[allow(clippy::print_stdout)]
pub fn checkout(
    store: &mut LocalStore,
    name: String,
    email: &str,
    phone: Option<String>,
    language: Language,
) -> CommandResult {
    let customer = CustomerInfo {
        name,
        email: Email::parse(email)?,
        phone,
    };
    let mut cart = store.cart();
    let order = cart.checkout(customer).map_err(|e| match e {
        CartError::Empty => Message::CartEmpty.text(language).to_string(),
    })?;

    println!("{}  {}  {}", order.id, order.status, order.total);
    store.push_order(order)?;
    store.save_cart(&cart)?;
    Ok(())
}

/// One line per order.
#[must_use]
pub fn format_order(order: &Order) -> String {
    format!(
        "{}  {}  {}  {}",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.status,
        order.total
    )
}

#[allow(clippy::print_stdout)]
pub fn orders(store: &LocalStore) {
    for order in store.orders() {
        println!("{}", format_order(&order));
    }
}

/// Print one order as JSON.
///
/// # Errors
///
/// Returns an error if the order is unknown.
#[allow(clippy::print_stdout)]
pub fn show_order(store: &LocalStore, id: &str) -> CommandResult {
    let id = OrderId::new(id);
    let order = store
        .orders()
        .into_iter()
        .find(|order| order.id == id)
        .ok_or_else(|| format!("no order {id}"))?;
    println!("{}", serde_json::to_string_pretty(&order)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use retropost_server::catalog::Catalog;

    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        (dir, store)
    }

    fn add_template(store: &mut LocalStore, id: &str) -> CartItemId {
        let template = Catalog::builtin().get(id).cloned().unwrap();
        add(store, template, Customization::default(), None).unwrap();
        store.cart().items().last().unwrap().id.clone()
    }

    #[test]
    fn test_quantity_and_remove() {
        let (_dir, mut store) = store();
        let first = add_template(&mut store, "1");
        let second = add_template(&mut store, "2");

        quantity(&mut store, first.as_str(), 3).unwrap();
        assert_eq!(store.cart().item_count(), 4);

        quantity(&mut store, second.as_str(), 0).unwrap();
        assert_eq!(store.cart().items().len(), 1);

        assert!(remove(&mut store, "missing").is_err());
        remove(&mut store, first.as_str()).unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_checkout_records_order() {
        let (_dir, mut store) = store();
        add_template(&mut store, "4");

        checkout(&mut store, "Ana".to_string(), "ana@example.hr", None, Language::Hr).unwrap();

        assert!(store.cart().is_empty());
        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer_info.name, "Ana");
        assert!(show_order(&store, orders[0].id.as_str()).is_ok());
        assert!(show_order(&store, "nope").is_err());
    }

    #[test]
    fn test_empty_checkout_is_localized() {
        let (_dir, mut store) = store();
        let err = checkout(&mut store, "Ana".to_string(), "ana@example.hr", None, Language::En)
            .unwrap_err();
        assert_eq!(err.to_string(), "Your cart is empty");
        assert!(store.orders().is_empty());
    }

    #[test]
    fn test_clear() {
        let (_dir, mut store) = store();
        add_template(&mut store, "1");
        clear(&mut store).unwrap();
        assert!(store.cart().is_empty());
    }
}
