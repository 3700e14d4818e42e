//! Single-flight token refresh coordination.
//!
//! # States
//! - Idle: no refresh in flight
//! - Refreshing: one leader is calling the refresh endpoint, followers wait
//!
//! # State Transitions
//! ```text
//! Idle → Refreshing: acquire_or_enqueue() hands out the leader guard
//! Refreshing → Refreshing: acquire_or_enqueue() enqueues a follower
//! Refreshing → Idle: the leader guard settles (explicitly or on drop)
//! ```
//!
//! The check and the transition happen under one lock acquisition, so two
//! requests failing at the same moment can never both become leader.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Outcome delivered to followers: the new token, or `None` when the refresh failed.
pub type RefreshOutcome = Option<String>;

#[derive(Debug, Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Owner of the refreshing flag and the queue of waiting requests.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// What a request that saw a 401 must do next.
#[derive(Debug)]
pub enum Ticket<'a> {
    /// Perform the refresh, then settle the guard.
    Leader(RefreshGuard<'a>),
    /// Wait for the leader's outcome.
    Follower(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Become the leader if idle, otherwise join the queue.
    pub fn acquire_or_enqueue(&self) -> Ticket<'_> {
        let mut state = self.lock();
        match &mut *state {
            RefreshState::Idle => {
                *state = RefreshState::Refreshing {
                    waiters: Vec::new(),
                };
                Ticket::Leader(RefreshGuard {
                    coordinator: self,
                    settled: false,
                })
            }
            RefreshState::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Ticket::Follower(rx)
            }
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), RefreshState::Refreshing { .. })
    }

    /// Number of followers currently waiting.
    pub fn pending(&self) -> usize {
        match &*self.lock() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// The only place the refreshing state is cleared.
    fn settle(&self, outcome: RefreshOutcome) -> usize {
        let previous = std::mem::take(&mut *self.lock());
        let RefreshState::Refreshing { waiters } = previous else {
            return 0;
        };
        let count = waiters.len();
        for waiter in waiters {
            // A follower whose future was dropped no longer listens.
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

/// Proof of leadership. Settling it drains the queue and returns to idle.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshGuard<'_> {
    /// Wake every follower with `outcome`. Returns how many were waiting.
    pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            // Leader future cancelled or panicked mid-refresh.
            self.coordinator.settle(None);
        }
    }
}
