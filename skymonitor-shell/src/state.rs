//! Partage d'état entre la boucle d'événements et ses handles clonables
//! (minuteries, stubs du devkit).

use parking_lot::Mutex;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Copie de l'état courant, verrou relâché aussitôt.
pub fn snapshot<T: Clone>(state: &Shared<T>) -> T {
    state.lock().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let state = new_state(vec![1]);
        let handle = state.clone();
        handle.lock().push(2);
        assert_eq!(snapshot(&state), vec![1, 2]);
    }
}
