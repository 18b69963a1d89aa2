//! Table des routes du tableau de bord (ensemble fermé).

/// Pages navigables ; chaque chemin connu a exactement une entrée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Dashboard,
    Serveurs,
    Postes,
    Conteneurs,
    Metriques,
    Parametres,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Dashboard,
        Route::Serveurs,
        Route::Postes,
        Route::Conteneurs,
        Route::Metriques,
        Route::Parametres,
    ];

    /// Correspondance exacte sur le chemin (pas de slash final toléré).
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Home),
            "/dashboard" => Some(Route::Dashboard),
            "/serveurs" => Some(Route::Serveurs),
            "/postes" => Some(Route::Postes),
            "/conteneurs" => Some(Route::Conteneurs),
            "/metriques" => Some(Route::Metriques),
            "/parametres" => Some(Route::Parametres),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Dashboard => "/dashboard",
            Route::Serveurs => "/serveurs",
            Route::Postes => "/postes",
            Route::Conteneurs => "/conteneurs",
            Route::Metriques => "/metriques",
            Route::Parametres => "/parametres",
        }
    }

    /// Identifiant de page côté gabarits
    pub fn page_id(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Dashboard => "dashboard",
            Route::Serveurs => "serveurs",
            Route::Postes => "postes",
            Route::Conteneurs => "conteneurs",
            Route::Metriques => "metriques",
            Route::Parametres => "parametres",
        }
    }
}
