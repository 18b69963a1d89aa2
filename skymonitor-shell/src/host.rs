//! Browser host facilities seen by the engines: history, clock and timers.
//!
//! Nothing here is ambient: the `Shell` owns one implementation of each and
//! lends it to the engines for the duration of a single event.

use std::time::{Duration, Instant};

/// Milliseconds on the shell's monotonic clock.
pub type Millis = u64;

/// Handle returned by [`Timers`]; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Millis;
}

/// Monotonic clock counting from shell start-up.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

/// Timer scheduling, `setInterval`/`setTimeout` style.
///
/// Firing is delivered back to the shell as a `ShellEvent::TimerFired`, so
/// callbacks never interleave with other event handling.
pub trait Timers: Send {
    fn set_interval(&mut self, period: Duration) -> TimerId;
    fn set_timeout(&mut self, delay: Duration) -> TimerId;
    /// Clearing an unknown or already-fired id is a no-op.
    fn clear(&mut self, id: TimerId);
}

/// Session history, `pushState`/`back`/`forward` style.
pub trait History: Send {
    fn push(&mut self, path: &str);
    fn current(&self) -> String;
    /// Moves one entry back and returns the new location, if any.
    fn back(&mut self) -> Option<String>;
    /// Moves one entry forward and returns the new location, if any.
    fn forward(&mut self) -> Option<String>;
}

/// In-memory history stack used by the headless shell and the tests.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial_path: &str) -> Self {
        Self {
            entries: vec![initial_path.to_string()],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl History for MemoryHistory {
    fn push(&mut self, path: &str) {
        // Un push après un retour arrière écrase les entrées "en avant"
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;
    }

    fn current(&self) -> String {
        self.entries[self.index].clone()
    }

    fn back(&mut self) -> Option<String> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    fn forward(&mut self) -> Option<String> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_push_back_forward() {
        let mut history = MemoryHistory::new("/");
        history.push("/dashboard");
        history.push("/serveurs");
        assert_eq!(history.current(), "/serveurs");

        assert_eq!(history.back().as_deref(), Some("/dashboard"));
        assert_eq!(history.back().as_deref(), Some("/"));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward().as_deref(), Some("/dashboard"));
    }

    #[test]
    fn test_push_after_back_drops_forward_entries() {
        let mut history = MemoryHistory::new("/");
        history.push("/dashboard");
        history.back();
        history.push("/postes");
        assert_eq!(history.entries(), ["/", "/postes"]);
        assert_eq!(history.forward(), None);
    }
}
