//! Static postcard template catalog.

use retropost_core::{Template, TemplateId};

/// Category value that matches every template.
pub const ALL_CATEGORIES: &str = "sve";

/// Identifier of a template built from an uploaded photo.
pub const CUSTOM_TEMPLATE_ID: &str = "custom";

const PEXELS_QUERY: &str = "?auto=compress&cs=tinysrgb&w=800";

/// `(id, name, pexels path, category, description)`
const ENTRIES: [(&str, &str, &str, &str, &str); 8] = [
    (
        "1",
        "Tropska Plaža",
        "photos/457882/pexels-photo-457882.jpeg",
        "priroda",
        "Prekrasna tropska plaža s kristalno čistim morem",
    ),
    (
        "2",
        "Planinski Vrh",
        "photos/417074/pexels-photo-417074.jpeg",
        "priroda",
        "Spektakularan pogled s planinskog vrha",
    ),
    (
        "3",
        "Gradska Panorama",
        "photos/378570/pexels-photo-378570.jpeg",
        "grad",
        "Moderna gradska panorama u sumrak",
    ),
    (
        "4",
        "Romantični Zalazak",
        "photos/206359/pexels-photo-206359.jpeg",
        "romantika",
        "Čaroban zalazak sunca nad morem",
    ),
    (
        "5",
        "Jesenska Šuma",
        "photos/33109/fall-autumn-red-season.jpg",
        "priroda",
        "Šarena jesenska šuma u punoj slavi",
    ),
    (
        "6",
        "Mirno Jezero",
        "photos/1032650/pexels-photo-1032650.jpeg",
        "priroda",
        "Spokojno jezero okruženo planinama",
    ),
    (
        "7",
        "Urbani Stil",
        "photos/936722/pexels-photo-936722.jpeg",
        "grad",
        "Moderni urbani dizajn i arhitektura",
    ),
    (
        "8",
        "Cvijetni Vrt",
        "photos/1118873/pexels-photo-1118873.jpeg",
        "priroda",
        "Prekrasan cvijetni vrt u proljeće",
    ),
];

/// The fixed set of templates offered to users.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<Template>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The eight built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = ENTRIES
            .iter()
            .map(|(id, name, path, category, description)| Template {
                id: TemplateId::new(*id),
                name: (*name).to_string(),
                image: format!("https://images.pexels.com/{path}{PEXELS_QUERY}"),
                category: (*category).to_string(),
                description: (*description).to_string(),
                price: None,
            })
            .collect();
        Self { templates }
    }

    #[must_use]
    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id.as_str() == id)
    }

    /// Templates in `category` (or any, for `None` / `"sve"`) whose name or
    /// description contains `search`, case-insensitively.
    #[must_use]
    pub fn filter(&self, category: Option<&str>, search: Option<&str>) -> Vec<&Template> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);
        let search = search.map(str::trim).unwrap_or_default();

        self.templates
            .iter()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .filter(|t| t.matches_search(search))
            .collect()
    }

    /// A one-off template around an uploaded photo.
    #[must_use]
    pub fn custom(image: impl Into<String>) -> Template {
        Template {
            id: TemplateId::new(CUSTOM_TEMPLATE_ID),
            name: "Vaša fotografija".to_string(),
            image: image.into(),
            category: "custom".to_string(),
            description: "Vaša prilagođena fotografija".to_string(),
            price: None,
        }
    }
}
