//! Extraction du contenu de page depuis un document HTML complet.

use scraper::{Html, Selector};

/// Marqueurs essayés dans l'ordre : `.page-content`, puis `main`.
const CONTENT_MARKERS: [&str; 2] = [".page-content", "main"];

/// Renvoie le HTML interne de la région "contenu de page", si présente.
pub fn extract_page_content(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    CONTENT_MARKERS.iter().find_map(|marker| {
        let selector = Selector::parse(marker).ok()?;
        document.select(&selector).next().map(|region| region.inner_html())
    })
}
