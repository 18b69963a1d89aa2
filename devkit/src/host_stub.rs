/*!
Horloge et minuteries virtuelles

`ManualTimers` ne déclenche rien seul : le harness demande la prochaine
échéance (`next_due`) puis la consomme (`fire`). Les clones partagent la
même table, comme `MockMqttClient` partageait ses messages.
*/

use skymonitor_shell::host::{Clock, Millis, TimerId, Timers};
use skymonitor_shell::state::{new_state, Shared};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Millis) -> Millis {
        self.now.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Millis,
    period: Millis,
    repeat: bool,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_id: u64,
    active: BTreeMap<TimerId, Scheduled>,
}

#[derive(Clone)]
pub struct ManualTimers {
    clock: ManualClock,
    table: Shared<TimerTable>,
}

impl ManualTimers {
    pub fn new(clock: ManualClock) -> Self {
        Self { clock, table: new_state(TimerTable::default()) }
    }

    pub fn active_count(&self) -> usize {
        self.table.lock().active.len()
    }

    pub fn active_intervals(&self) -> usize {
        self.table.lock().active.values().filter(|s| s.repeat).count()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.table.lock().active.contains_key(&id)
    }

    /// Échéance la plus proche au plus tard à `until` (ordre d'armement à égalité).
    pub fn next_due(&self, until: Millis) -> Option<(TimerId, Millis)> {
        self.table
            .lock()
            .active
            .iter()
            .filter(|(_, s)| s.due <= until)
            .min_by_key(|(id, s)| (s.due, **id))
            .map(|(id, s)| (*id, s.due))
    }

    /// Consomme une échéance : un intervalle est reprogrammé, un timeout retiré.
    pub fn fire(&self, id: TimerId) -> bool {
        let mut table = self.table.lock();
        let Some(scheduled) = table.active.get_mut(&id) else {
            return false;
        };
        if scheduled.repeat {
            scheduled.due += scheduled.period;
        } else {
            table.active.remove(&id);
        }
        true
    }

    fn add(&mut self, period: Duration, repeat: bool) -> TimerId {
        let period = period.as_millis() as Millis;
        let due = self.clock.now_ms() + period;
        let mut table = self.table.lock();
        table.next_id += 1;
        let id = TimerId(table.next_id);
        table.active.insert(id, Scheduled { due, period, repeat });
        id
    }
}

impl Timers for ManualTimers {
    fn set_interval(&mut self, period: Duration) -> TimerId {
        self.add(period, true)
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.add(delay, false)
    }

    fn clear(&mut self, id: TimerId) {
        self.table.lock().active.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_reschedules_and_timeout_expires() {
        let clock = ManualClock::new();
        let mut timers = ManualTimers::new(clock.clone());
        let tick = timers.set_interval(Duration::from_millis(2000));
        let once = timers.set_timeout(Duration::from_millis(3000));

        assert_eq!(timers.next_due(1999), None);
        assert_eq!(timers.next_due(5000), Some((tick, 2000)));
        assert!(timers.fire(tick));
        assert_eq!(timers.next_due(5000), Some((once, 3000)));
        assert!(timers.fire(once));
        assert!(!timers.is_active(once));
        assert_eq!(timers.next_due(5000), Some((tick, 4000)));
        assert_eq!(timers.active_intervals(), 1);
    }

    #[test]
    fn test_timers_arm_relative_to_clock() {
        let clock = ManualClock::new();
        let mut timers = ManualTimers::new(clock.clone());
        assert_eq!(clock.advance(500), 500);
        let id = timers.set_timeout(Duration::from_millis(100));
        assert_eq!(timers.next_due(u64::MAX), Some((id, 600)));
        timers.clear(id);
        assert_eq!(timers.active_count(), 0);
    }
}
