// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/broadcast.rs
// Version: 1.0.0
//
// Multi-subscriber fan-out for jobs and responses. Each listener owns its own
// bounded queue; publishing never waits on a slow listener.

use log::debug;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};

const LOG_TARGET: &str = "stratum_miner::pool::broadcast";

pub struct Relay<T: Clone> {
    name: &'static str,
    listeners: Mutex<Vec<mpsc::Sender<T>>>,
}

impl<T: Clone> Relay<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener with its own buffer of `buffer` items (at least 1)
    pub fn listener(&self, buffer: usize) -> Listener<T> {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        Listener { rx }
    }

    /// Deliver `item` to every live listener
    pub fn notify(&self, item: T) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|tx| match tx.try_send(item.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(target: LOG_TARGET, "Dropping {} for a full listener", self.name);
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });
    }

    pub fn listener_count(&self) -> usize {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|tx| !tx.is_closed());
        listeners.len()
    }
}

pub struct Listener<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Listener<T> {
    /// Next item, or `None` once the relay is gone
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Unsubscribe; the relay prunes this listener on its next publication
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_listener_receives_items() {
        let relay = Relay::new("test");
        let mut a = relay.listener(4);
        let mut b = relay.listener(4);
        relay.notify(1u32);
        relay.notify(2u32);
        assert_eq!(a.recv().await, Some(1));
        assert_eq!(a.recv().await, Some(2));
        assert_eq!(b.recv().await, Some(1));
        assert_eq!(b.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_full_listener_does_not_block_others() {
        let relay = Relay::new("test");
        let mut slow = relay.listener(1);
        let mut fast = relay.listener(8);
        for i in 0..5u32 {
            relay.notify(i);
        }
        assert_eq!(slow.try_recv(), Some(0));
        assert_eq!(slow.try_recv(), None);
        for i in 0..5u32 {
            assert_eq!(fast.recv().await, Some(i));
        }
    }

    #[test]
    fn test_closed_listeners_are_pruned() {
        let relay = Relay::new("test");
        let mut gone = relay.listener(1);
        let _kept = relay.listener(1);
        gone.close();
        relay.notify(1u8);
        assert_eq!(relay.listener_count(), 1);
    }

    #[test]
    fn test_zero_buffer_is_promoted() {
        let relay = Relay::new("test");
        let mut listener = relay.listener(0);
        relay.notify("x");
        assert_eq!(listener.try_recv(), Some("x"));
    }
}
