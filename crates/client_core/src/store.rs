//! Observable value holder: read the latest snapshot or subscribe to replacements.

use tokio::sync::watch;

pub struct Store<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Publishes `value` to every subscriber and returns the previous one.
    pub fn replace(&self, value: T) -> T {
        self.tx.send_replace(value)
    }
}
