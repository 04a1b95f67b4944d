//! Catalog listing.

use retropost_core::Template;
use retropost_server::catalog::Catalog;

/// One line per template.
#[must_use]
pub fn format_row(template: &Template) -> String {
    format!(
        "{:>3}  {:<22} {:<10} {}",
        template.id.as_str(),
        template.name,
        template.category,
        template.effective_price()
    )
}

/// List templates, optionally filtered.
#[allow(clippy::print_stdout)]
pub fn list(category: Option<&str>, search: Option<&str>) {
    let catalog = Catalog::builtin();
    let templates = catalog.filter(category, search);
    if templates.is_empty() {
        println!("No templates match.");
        return;
    }
    for template in templates {
        println!("{}", format_row(template));
    }
}
