//! Nonce Allocator
//!
//! Hands out strictly increasing nonces to every send path of the process.

use std::sync::{Mutex, PoisonError};

/// Shared nonce counter, seeded from the chain's pending nonce.
#[derive(Debug)]
pub struct NonceAllocator {
    next: Mutex<u64>,
}

impl NonceAllocator {
    pub fn new(start: u64) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }

    /// Reserve the next nonce. The lock is held only for read-increment-return.
    pub fn allocate(&self) -> u64 {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *next;
        *next += 1;
        current
    }

    /// Next nonce that `allocate` would return.
    pub fn peek(&self) -> u64 {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
