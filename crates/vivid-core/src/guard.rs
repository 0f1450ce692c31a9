//! Re-entrancy guard for configuration handlers.
//!
//! A handler that writes back to the configuration store while reacting to a
//! change must not be re-entered by the notification its own write produces.
//! The guard hands out a single RAII token; while it is alive, further entry
//! attempts are refused.

use std::cell::Cell;
use std::rc::Rc;

/// Single-threaded re-entrancy guard.
#[derive(Debug, Default, Clone)]
pub struct ReentrancyGuard {
    active: Rc<Cell<bool>>,
}

/// Proof of entry. Releases the guard on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    active: Rc<Cell<bool>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the guarded section, or `None` if it is already held.
    pub fn try_enter(&self) -> Option<GuardToken> {
        if self.active.replace(true) {
            return None;
        }
        Some(GuardToken {
            active: Rc::clone(&self.active),
        })
    }

    /// Whether a token is currently alive.
    pub fn is_held(&self) -> bool {
        self.active.get()
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.active.set(false);
    }
}
