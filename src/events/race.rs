//! First-of-N race over bus signals, with listener cleanup.
//!
//! Every source gets a one-shot listener that competes for a single result
//! slot. The first listener to fire takes the slot and unsubscribes all of
//! the race's listeners before the others can run; dropping the race (e.g.
//! when the command that should trigger the signals fails) removes them too.

use super::{EventBus, ListenerId};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RaceError {
    #[error("Every race listener was removed before a signal arrived")]
    Abandoned,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An armed race. Await `settle` for the winning signal.
pub struct Race<T> {
    bus: Arc<EventBus>,
    ids: Arc<Mutex<Vec<ListenerId>>>,
    rx: oneshot::Receiver<T>,
}

impl<T> Race<T> {
    /// Resolve with the first signal's mapped value.
    pub async fn settle(mut self) -> Result<T, RaceError> {
        // Listeners are removed by Drop when `self` goes out of scope.
        (&mut self.rx).await.map_err(|_| RaceError::Abandoned)
    }

    /// Listeners still subscribed on behalf of this race.
    pub fn pending_listeners(&self) -> usize {
        lock(&self.ids).len()
    }
}

impl<T> Drop for Race<T> {
    fn drop(&mut self) {
        for id in lock(&self.ids).drain(..) {
            self.bus.unlisten(id);
        }
    }
}

/// Registers the competing sources. Listeners are live as soon as `on`
/// returns, so build the race before starting the operation that signals.
pub struct RaceBuilder<T> {
    race: Race<T>,
    winner: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T: Send + 'static> RaceBuilder<T> {
    pub fn new(bus: Arc<EventBus>) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            race: Race {
                bus,
                ids: Arc::new(Mutex::new(Vec::new())),
                rx,
            },
            winner: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Add `event` as a source; `map` turns its payload into the race result.
    pub fn on<F>(self, event: &str, map: F) -> Self
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
    {
        let winner = Arc::clone(&self.winner);
        let ids = Arc::clone(&self.race.ids);
        let bus = Arc::downgrade(&self.race.bus);
        let name = event.to_string();

        let id = self.race.bus.listen(event, move |payload| {
            let Some(tx) = lock(&winner).take() else {
                return;
            };
            log::debug!("[EVENTS] Race settled by '{}'", name);
            if let Some(bus) = bus.upgrade() {
                for id in lock(&ids).drain(..) {
                    bus.unlisten(id);
                }
            }
            let _ = tx.send(map(payload));
        });

        lock(&self.race.ids).push(id);
        self
    }

    pub fn arm(self) -> Race<T> {
        self.race
    }
}
