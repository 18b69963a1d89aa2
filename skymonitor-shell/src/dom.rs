/**
 * DOCUMENT - Surface DOM manipulée par les moteurs
 *
 * RÔLE :
 * Interface minimale sur le document : régions identifiées par `id`, liens
 * de navigation (classe `active`), pile de notifications.
 *
 * FONCTIONNEMENT :
 * - `Document` = trait consommé par la navigation, les pages et les métriques
 * - `MemoryDocument` = implémentation en mémoire (coquille headless + tests)
 * - Injecter du HTML dans une région y monte les éléments `id` qu'il contient
 *   et démonte ceux de l'ancien contenu, comme `innerHTML` dans un navigateur
 *
 * Une région absente n'est jamais une erreur : les écritures renvoient `false`.
 */

use crate::format::escape_html;
use crate::metrics::DisplayIds;
use crate::routes::Route;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub trait Document: Send {
    fn has_element(&self, id: &str) -> bool;
    fn inner_html(&self, id: &str) -> Option<String>;
    /// Remplace le contenu ; `false` si l'élément n'existe pas.
    fn set_inner_html(&mut self, id: &str, html: &str) -> bool;
    fn set_text(&mut self, id: &str, text: &str) -> bool;
    fn is_visible(&self, id: &str) -> Option<bool>;
    fn set_visible(&mut self, id: &str, visible: bool) -> bool;

    fn clear_active_links(&mut self);
    /// Marque `active` le lien dont le href vaut exactement `href`.
    fn activate_link(&mut self, href: &str) -> bool;
    fn active_link(&self) -> Option<String>;

    fn append_notification(&mut self, id: u64, kind: &str, html: &str);
    fn remove_notification(&mut self, id: u64) -> bool;
    fn notification_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Element {
    html: String,
    visible: bool,
    parent: Option<String>,
}

#[derive(Debug, Clone)]
struct NavLink {
    href: String,
    active: bool,
}

/// Notification actuellement montée dans le `<body>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedNotification {
    pub id: u64,
    pub kind: String,
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: BTreeMap<String, Element>,
    nav_links: Vec<NavLink>,
    notifications: Vec<MountedNotification>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gabarit de base : région principale, liens de toutes les routes,
    /// affichage des métriques et indicateur de connexion.
    pub fn shell_layout(display: &DisplayIds) -> Self {
        let mut doc = Self::new()
            .with_element(crate::navigation::MAIN_CONTENT_ID, "")
            .with_element(&display.cpu, "")
            .with_element(&display.memory, "")
            .with_element(&display.disk, "")
            .with_element(&display.badge, "Simulé")
            .with_element(crate::shell::CONNECTION_STATUS_ID, "");
        for route in Route::ALL {
            doc = doc.with_nav_link(route.path());
        }
        doc
    }

    pub fn with_element(mut self, id: &str, html: &str) -> Self {
        self.elements.insert(
            id.to_string(),
            Element { html: String::new(), visible: true, parent: None },
        );
        self.set_inner_html(id, html);
        self
    }

    pub fn with_nav_link(mut self, href: &str) -> Self {
        self.nav_links.push(NavLink { href: href.to_string(), active: false });
        self
    }

    pub fn notifications(&self) -> &[MountedNotification] {
        &self.notifications
    }

    fn remove_descendants(&mut self, id: &str) {
        let children: Vec<String> = self
            .elements
            .iter()
            .filter(|(_, el)| el.parent.as_deref() == Some(id))
            .map(|(child, _)| child.clone())
            .collect();

        for child in children {
            self.remove_descendants(&child);
            self.elements.remove(&child);
        }
    }

    fn mount_children(&mut self, region: &str, html: &str) {
        let fragment = Html::parse_fragment(html);
        let Ok(selector) = Selector::parse("[id]") else {
            return;
        };

        let mut mounted: HashSet<String> = HashSet::new();
        for node in fragment.select(&selector) {
            let Some(id) = node.value().id() else { continue };
            // id déjà monté hors de la région (la région elle-même, un ancêtre,
            // la barre de navigation) : le premier élément du document gagne
            if self.elements.contains_key(id) {
                debug!("id {id} déjà présent, non remonté sous {region}");
                continue;
            }
            // parent = ancêtre monté le plus proche dans le fragment, sinon la région
            let parent = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .filter_map(|ancestor| ancestor.value().id())
                .find(|ancestor| mounted.contains(*ancestor))
                .unwrap_or(region)
                .to_string();
            mounted.insert(id.to_string());
            self.elements.insert(
                id.to_string(),
                Element { html: node.inner_html(), visible: true, parent: Some(parent) },
            );
        }
    }
}

impl Document for MemoryDocument {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|el| el.html.clone())
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> bool {
        if !self.elements.contains_key(id) {
            return false;
        }
        self.remove_descendants(id);
        if let Some(el) = self.elements.get_mut(id) {
            el.html = html.to_string();
        }
        self.mount_children(id, html);
        true
    }

    fn set_text(&mut self, id: &str, text: &str) -> bool {
        if !self.elements.contains_key(id) {
            return false;
        }
        self.remove_descendants(id);
        if let Some(el) = self.elements.get_mut(id) {
            el.html = escape_html(text);
        }
        true
    }

    fn is_visible(&self, id: &str) -> Option<bool> {
        self.elements.get(id).map(|el| el.visible)
    }

    fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.elements.get_mut(id) {
            Some(el) => {
                el.visible = visible;
                true
            }
            None => false,
        }
    }

    fn clear_active_links(&mut self) {
        for link in &mut self.nav_links {
            link.active = false;
        }
    }

    fn activate_link(&mut self, href: &str) -> bool {
        match self.nav_links.iter_mut().find(|link| link.href == href) {
            Some(link) => {
                link.active = true;
                true
            }
            None => false,
        }
    }

    fn active_link(&self) -> Option<String> {
        self.nav_links.iter().find(|link| link.active).map(|link| link.href.clone())
    }

    fn append_notification(&mut self, id: u64, kind: &str, html: &str) {
        self.notifications.push(MountedNotification {
            id,
            kind: kind.to_string(),
            html: html.to_string(),
        });
    }

    fn remove_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    fn notification_count(&self) -> usize {
        self.notifications.len()
    }
}
