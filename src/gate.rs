//! Latest-request gate for overlapping computations.
//!
//! Each computation takes a [`RequestToken`] before it starts. When it
//! finishes it offers its result with [`LatestGate::publish`], which applies
//! the result only if no newer token was issued in the meantime. Results of
//! superseded requests are handed back to the caller and never become
//! visible through [`LatestGate::latest`].

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

/// Ticket identifying one computation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A value that was published, with the token of the request that made it.
#[derive(Debug, Clone)]
pub struct Published<T> {
    pub token: RequestToken,
    pub value: T,
}

/// Keeps only the result of the most recently issued request.
pub struct LatestGate<T> {
    issued: AtomicU64,
    latest: RwLock<Option<Published<T>>>,
}

impl<T> Default for LatestGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestGate<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }

    /// Issue a token; every token issued earlier is now superseded.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued token, if any.
    pub fn last_issued(&self) -> Option<RequestToken> {
        match self.issued.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }

    /// Whether `token` is still the most recent one issued.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.issued.load(Ordering::SeqCst) == token.0
    }

    /// Apply `value` if `token` is still current.
    ///
    /// Returns the value back when the request was superseded.
    pub async fn publish(&self, token: RequestToken, value: T) -> Result<(), T> {
        // Checked under the write lock so a newer publish cannot interleave.
        let mut latest = self.latest.write().await;
        if !self.is_current(token) {
            debug!(
                "Discarding result of request {} (latest is {})",
                token.0,
                self.issued.load(Ordering::SeqCst)
            );
            return Err(value);
        }
        *latest = Some(Published { token, value });
        Ok(())
    }
}

impl<T: Clone> LatestGate<T> {
    /// The most recently published value, if any.
    pub async fn latest(&self) -> Option<Published<T>> {
        self.latest.read().await.clone()
    }
}
