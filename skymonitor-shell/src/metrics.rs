/**
 * ARBITRAGE DES MÉTRIQUES - Live vs simulé pour la barre de navigation
 *
 * RÔLE :
 * Possède la lecture canonique {cpu, memory, disk} et décide si elle vient
 * d'un push live ou d'une marche aléatoire locale. La barre de navigation
 * affiche toujours la dernière lecture, quelle que soit sa provenance.
 *
 * FONCTIONNEMENT :
 * - Lecture live => écrase les champs présents, annule le tick de simulation,
 *   réarme la minuterie de reprise (fenêtre d'inactivité, 7000 ms par défaut)
 * - Reprise sans lecture live intermédiaire => mode Simulé + tick répété
 *   (2000 ms par défaut), chaque tick perturbe les champs de ±step/2
 * - Une seule minuterie de tick et une seule minuterie de reprise à la fois
 *
 * Les valeurs restent dans [0, 100] après toute mise à jour.
 */

use crate::config::{MetricsConf, SeedRanges};
use crate::dom::Document;
use crate::format::format_percentage;
use crate::host::{Millis, TimerId, Timers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Identifiants des éléments d'affichage de la barre de navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayIds {
    pub cpu: String,
    pub memory: String,
    pub disk: String,
    pub badge: String,
}

impl Default for DisplayIds {
    fn default() -> Self {
        Self {
            cpu: "nav-cpu-value".into(),
            memory: "nav-memory-value".into(),
            disk: "nav-disk-value".into(),
            badge: "nav-simulated-badge".into(),
        }
    }
}

/// Lecture en pourcentages, chaque champ dans [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReading {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Live,
    Simulated,
}

/// Payload `system_metrics` ; un champ absent ou non numérique vaut `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveMetrics {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_percent: Option<f64>,
}

impl LiveMetrics {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            cpu_percent: coerce_number(payload.get("cpu_percent")),
            memory_percent: coerce_number(payload.get("memory_percent")),
            disk_percent: coerce_number(payload.get("disk_percent")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none() && self.memory_percent.is_none() && self.disk_percent.is_none()
    }
}

/// Nombres JSON et chaînes numériques acceptés ; NaN/∞ et le reste ignorés.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Tirage dans une plage de config non validée : bornes réordonnées et
/// ramenées dans [0, 100] ; une borne non finie vaut 0.
fn sample<R: Rng>(rng: &mut R, [a, b]: [f64; 2]) -> f64 {
    let a = if a.is_finite() { clamp_percent(a) } else { 0.0 };
    let b = if b.is_finite() { clamp_percent(b) } else { 0.0 };
    rng.gen_range(a.min(b)..=a.max(b))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub struct MetricsEngine<R: Rng = StdRng> {
    config: MetricsConf,
    rng: R,
    reading: Option<MetricReading>,
    last_live_at: Option<Millis>,
    mode: Mode,
    tick_timer: Option<TimerId>,
    resume_timer: Option<TimerId>,
}

impl MetricsEngine<StdRng> {
    pub fn new(config: MetricsConf) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> MetricsEngine<R> {
    pub fn with_rng(config: MetricsConf, rng: R) -> Self {
        Self {
            config,
            rng,
            reading: None,
            last_live_at: None,
            mode: Mode::Simulated,
            tick_timer: None,
            resume_timer: None,
        }
    }

    pub fn config(&self) -> &MetricsConf {
        &self.config
    }

    pub fn reading(&self) -> Option<MetricReading> {
        self.reading
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn last_live_at(&self) -> Option<Millis> {
        self.last_live_at
    }

    pub fn is_simulating(&self) -> bool {
        self.tick_timer.is_some()
    }

    /// Vrai si aucune lecture live n'est arrivée dans la fenêtre d'inactivité
    pub fn is_stale(&self, now: Millis) -> bool {
        match self.last_live_at {
            Some(at) => now.saturating_sub(at) >= self.config.inactivity_ms,
            None => true,
        }
    }

    /// Démarrage : graine plausible affichée, simulation après la fenêtre
    /// si aucune télémétrie n'arrive.
    pub fn start(&mut self, now: Millis, timers: &mut dyn Timers, doc: &mut dyn Document) {
        if self.reading.is_none() {
            self.reading = Some(self.seed());
        }
        self.arm_resume(timers);
        self.render(now, doc);
    }

    /// Entrée en mode Live : les champs présents écrasent la lecture.
    pub fn apply_live(
        &mut self,
        update: &LiveMetrics,
        now: Millis,
        timers: &mut dyn Timers,
        doc: &mut dyn Document,
    ) {
        let mut reading = match self.reading {
            Some(reading) => reading,
            None => self.seed(),
        };
        if let Some(cpu) = update.cpu_percent {
            reading.cpu = clamp_percent(cpu);
        }
        if let Some(memory) = update.memory_percent {
            reading.memory = clamp_percent(memory);
        }
        if let Some(disk) = update.disk_percent {
            reading.disk = clamp_percent(disk);
        }
        self.reading = Some(reading);

        if self.mode == Mode::Simulated {
            info!("métriques live reçues, arrêt de la simulation");
        }
        self.mode = Mode::Live;
        self.last_live_at = Some(now);
        self.stop_simulation(timers);
        self.arm_resume(timers);
        self.render(now, doc);
    }

    /// Route une minuterie vers le moteur ; `false` si elle ne lui appartient pas.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        now: Millis,
        timers: &mut dyn Timers,
        doc: &mut dyn Document,
    ) -> bool {
        if self.resume_timer == Some(id) {
            self.resume_timer = None;
            self.on_resume(now, timers, doc);
            true
        } else if self.tick_timer == Some(id) {
            self.tick(now, doc);
            true
        } else {
            false
        }
    }

    /// Idempotent : ne crée pas de second tick si un est actif.
    pub fn start_simulation(&mut self, timers: &mut dyn Timers) {
        if self.tick_timer.is_some() {
            return;
        }
        let period = Duration::from_millis(self.config.tick_ms);
        self.tick_timer = Some(timers.set_interval(period));
        debug!("tick de simulation démarré ({} ms)", self.config.tick_ms);
    }

    pub fn stop_simulation(&mut self, timers: &mut dyn Timers) {
        if let Some(id) = self.tick_timer.take() {
            timers.clear(id);
            debug!("tick de simulation arrêté");
        }
    }

    /// Écrit les trois valeurs formatées et le badge "simulé".
    pub fn render(&self, now: Millis, doc: &mut dyn Document) {
        let display = &self.config.display;
        if let Some(reading) = self.reading {
            doc.set_text(&display.cpu, &format_percentage(reading.cpu));
            doc.set_text(&display.memory, &format_percentage(reading.memory));
            doc.set_text(&display.disk, &format_percentage(reading.disk));
        }
        doc.set_visible(&display.badge, self.is_stale(now));
    }

    fn on_resume(&mut self, now: Millis, timers: &mut dyn Timers, doc: &mut dyn Document) {
        if !self.is_stale(now) {
            // lecture live arrivée sans réarmement : on attend la fin réelle de la fenêtre
            self.arm_resume(timers);
            return;
        }
        if self.reading.is_none() {
            self.reading = Some(self.seed());
        }
        if self.mode == Mode::Live {
            info!("aucune métrique live depuis {} ms, passage en simulation", self.config.inactivity_ms);
        }
        self.mode = Mode::Simulated;
        self.start_simulation(timers);
        self.render(now, doc);
    }

    fn tick(&mut self, now: Millis, doc: &mut dyn Document) {
        if !self.is_stale(now) {
            self.render(now, doc);
            return;
        }
        let step = self.config.step;
        if let Some(reading) = self.reading.as_mut() {
            for field in [&mut reading.cpu, &mut reading.memory, &mut reading.disk] {
                let delta = (self.rng.gen::<f64>() - 0.5) * step;
                *field = round1(clamp_percent(*field + delta));
            }
        }
        self.render(now, doc);
    }

    fn arm_resume(&mut self, timers: &mut dyn Timers) {
        if let Some(id) = self.resume_timer.take() {
            timers.clear(id);
        }
        let delay = Duration::from_millis(self.config.inactivity_ms);
        self.resume_timer = Some(timers.set_timeout(delay));
    }

    fn seed(&mut self) -> MetricReading {
        let SeedRanges { cpu, memory, disk } = self.config.seed;
        MetricReading {
            cpu: round1(sample(&mut self.rng, cpu)),
            memory: round1(sample(&mut self.rng, memory)),
            disk: round1(sample(&mut self.rng, disk)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::host::testing::FakeTimers;
    use serde_json::json;

    fn engine() -> MetricsEngine<StdRng> {
        MetricsEngine::with_rng(MetricsConf::default(), StdRng::seed_from_u64(7))
    }

    fn layout() -> MemoryDocument {
        MemoryDocument::shell_layout(&DisplayIds::default())
    }

    #[test]
    fn test_coercion_ignores_non_numeric_fields() {
        let update = LiveMetrics::from_payload(&json!({
            "cpu_percent": "42.5",
            "memory_percent": "abc",
            "disk_percent": null
        }));
        assert_eq!(update.cpu_percent, Some(42.5));
        assert_eq!(update.memory_percent, None);
        assert_eq!(update.disk_percent, None);

        let update = LiveMetrics::from_payload(&json!({"cpu_percent": true, "memory_percent": {"v": 1}}));
        assert!(update.is_empty());
    }

    #[test]
    fn test_partial_live_update() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        engine.reading = Some(MetricReading { cpu: 10.0, memory: 20.0, disk: 30.0 });

        let update = LiveMetrics::from_payload(&json!({"memory_percent": 55}));
        engine.apply_live(&update, 0, &mut timers, &mut doc);

        assert_eq!(engine.reading(), Some(MetricReading { cpu: 10.0, memory: 55.0, disk: 30.0 }));
        assert_eq!(engine.mode(), Mode::Live);
    }

    #[test]
    fn test_live_values_are_clamped() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        let update = LiveMetrics { cpu_percent: Some(140.0), memory_percent: Some(-3.0), disk_percent: None };
        engine.apply_live(&update, 0, &mut timers, &mut doc);

        let reading = engine.reading().unwrap();
        assert_eq!(reading.cpu, 100.0);
        assert_eq!(reading.memory, 0.0);
    }

    #[test]
    fn test_seed_within_documented_ranges() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        engine.start(0, &mut timers, &mut doc);

        let reading = engine.reading().unwrap();
        assert!((5.0..=15.0).contains(&reading.cpu));
        assert!((20.0..=40.0).contains(&reading.memory));
        assert!((30.0..=50.0).contains(&reading.disk));
        assert_eq!(timers.timeouts(), 1);
        assert_eq!(doc.is_visible("nav-simulated-badge"), Some(true));
    }

    #[test]
    fn test_seed_tolerates_inverted_and_nan_ranges() {
        let mut config = MetricsConf::default();
        config.seed = SeedRanges { cpu: [15.0, 5.0], memory: [f64::NAN, 40.0], disk: [50.0, 50.0] };
        let mut engine = MetricsEngine::with_rng(config, StdRng::seed_from_u64(3));
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        engine.start(0, &mut timers, &mut doc);

        let reading = engine.reading().unwrap();
        assert!((5.0..=15.0).contains(&reading.cpu));
        assert!((0.0..=40.0).contains(&reading.memory));
        assert_eq!(reading.disk, 50.0);
    }

    #[test]
    fn test_start_simulation_is_idempotent() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        engine.start_simulation(&mut timers);
        engine.start_simulation(&mut timers);
        assert_eq!(timers.intervals(), 1);

        engine.stop_simulation(&mut timers);
        assert_eq!(timers.intervals(), 0);
        assert!(!engine.is_simulating());
        engine.start_simulation(&mut timers);
        assert_eq!(timers.intervals(), 1);
    }

    #[test]
    fn test_live_reading_cancels_tick_and_rearms_single_resume() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        engine.start(0, &mut timers, &mut doc);
        engine.start_simulation(&mut timers);

        let update = LiveMetrics { cpu_percent: Some(42.3), ..Default::default() };
        engine.apply_live(&update, 100, &mut timers, &mut doc);
        engine.apply_live(&update, 200, &mut timers, &mut doc);

        assert_eq!(timers.intervals(), 0);
        assert_eq!(timers.timeouts(), 1);
        assert_eq!(doc.inner_html("nav-cpu-value").as_deref(), Some("42.3%"));
        assert_eq!(doc.is_visible("nav-simulated-badge"), Some(false));
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut config = MetricsConf::default();
        config.step = 60.0;
        let mut engine = MetricsEngine::with_rng(config, StdRng::seed_from_u64(42));
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        engine.reading = Some(MetricReading { cpu: 1.0, memory: 99.0, disk: 50.0 });
        engine.start_simulation(&mut timers);
        let tick = engine.tick_timer.unwrap();

        for i in 0..500 {
            assert!(engine.on_timer(tick, 10_000 + i * 2000, &mut timers, &mut doc));
            let r = engine.reading().unwrap();
            for v in [r.cpu, r.memory, r.disk] {
                assert!((0.0..=100.0).contains(&v), "hors bornes: {v}");
                assert_eq!(v, round1(v));
            }
        }
    }

    #[test]
    fn test_tick_near_boundary_only_rerenders() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        let update = LiveMetrics { cpu_percent: Some(10.0), memory_percent: Some(20.0), disk_percent: Some(30.0) };
        engine.apply_live(&update, 1000, &mut timers, &mut doc);
        engine.start_simulation(&mut timers);
        let tick = engine.tick_timer.unwrap();

        engine.on_timer(tick, 5000, &mut timers, &mut doc);
        assert_eq!(engine.reading(), Some(MetricReading { cpu: 10.0, memory: 20.0, disk: 30.0 }));
    }

    #[test]
    fn test_foreign_timer_is_not_consumed() {
        let mut engine = engine();
        let mut timers = FakeTimers::default();
        let mut doc = layout();
        assert!(!engine.on_timer(TimerId(999), 0, &mut timers, &mut doc));
    }
}
