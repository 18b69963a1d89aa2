/*!
# SkyMonitor DevKit - Stubs et utilitaires de test pour la coquille

Permet de piloter la coquille sans navigateur, sans backend et sans broker :
- `StubFetcher` : réponses HTTP préenregistrées, requêtes journalisées
- `ManualClock` / `ManualTimers` : temps virtuel avancé à la main
- `ShellEventBuilder` : payloads temps réel réalistes
- `TestHarness` : coquille complète câblée sur ces stubs
*/

pub mod event_builder;
pub mod fetch_stub;
pub mod host_stub;
pub mod test_utils;

pub use event_builder::ShellEventBuilder;
pub use fetch_stub::StubFetcher;
pub use host_stub::{ManualClock, ManualTimers};
pub use test_utils::TestHarness;
