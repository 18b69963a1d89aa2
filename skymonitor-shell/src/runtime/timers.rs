//! Minuteries tokio : chaque expiration revient en `ShellEvent::TimerFired`.

use crate::host::{TimerId, Timers};
use crate::shell::ShellEvent;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub struct TokioTimers {
    tx: UnboundedSender<ShellEvent>,
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(tx: UnboundedSender<ShellEvent>) -> Self {
        Self { tx, next_id: 0, tasks: HashMap::new() }
    }

    fn spawn(&mut self, period: Duration, repeat: bool) -> TimerId {
        // les timeouts expirés ne sont jamais effacés explicitement
        self.tasks.retain(|_, handle| !handle.is_finished());

        // tokio refuse une période nulle
        let period = period.max(Duration::from_millis(1));
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            if repeat {
                let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                loop {
                    interval.tick().await;
                    if tx.send(ShellEvent::TimerFired(id)).is_err() {
                        break;
                    }
                }
            } else {
                tokio::time::sleep(period).await;
                let _ = tx.send(ShellEvent::TimerFired(id));
            }
        });
        self.tasks.insert(id, handle);
        id
    }
}

impl Timers for TokioTimers {
    fn set_interval(&mut self, period: Duration) -> TimerId {
        self.spawn(period, true)
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.spawn(delay, false)
    }

    fn clear(&mut self, id: TimerId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}
