//! Notifications temporisées (toasts) : montées dans le document, retirées
//! à l'expiration de leur minuterie.

use crate::dom::Document;
use crate::format::escape_html;
use crate::host::{TimerId, Timers};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Info => "info-circle",
            NotificationKind::Success => "check-circle",
            NotificationKind::Warning => "exclamation-triangle",
            NotificationKind::Error => "times-circle",
        }
    }
}

pub struct Notifier {
    duration: Duration,
    next_id: u64,
    expiries: HashMap<TimerId, u64>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self { duration, next_id: 0, expiries: HashMap::new() }
    }

    pub fn show(
        &mut self,
        message: &str,
        kind: NotificationKind,
        doc: &mut dyn Document,
        timers: &mut dyn Timers,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let html = format!(
            r#"<i class="fas fa-{}"></i><span>{}</span>"#,
            kind.icon(),
            escape_html(message)
        );
        doc.append_notification(id, kind.as_str(), &html);
        let timer = timers.set_timeout(self.duration);
        self.expiries.insert(timer, id);
        debug!("notification {id} ({}) : {message}", kind.as_str());
        id
    }

    /// `false` si la minuterie n'est pas une expiration de notification.
    pub fn on_timer(&mut self, timer: TimerId, doc: &mut dyn Document) -> bool {
        match self.expiries.remove(&timer) {
            Some(id) => {
                doc.remove_notification(id);
                true
            }
            None => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.expiries.len()
    }
}
