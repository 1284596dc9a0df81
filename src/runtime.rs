//! Async plumbing shared by the widget's network-facing parts
//!
//! Requests that the user can supersede (address search, geolocation) are
//! issued through a [`RequestTracker`]. Every new request aborts the one in
//! flight and bumps the tracker's generation, so a response that still
//! arrives late carries a stale [`RequestToken`] and is dropped instead of
//! overwriting newer state.

use crate::{MapError, Result};
use futures::future::{AbortHandle, AbortRegistration, Abortable, BoxFuture, FutureExt};
use once_cell::sync::Lazy;
use std::future::Future;

/// Shared async HTTP client for geocoding, routing and provider requests
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("rental-map/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
});

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Tracks the latest request of one kind.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token, aborting whatever was in flight.
    pub fn issue(&mut self) -> (RequestToken, AbortRegistration) {
        self.cancel();
        self.generation += 1;
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        (RequestToken(self.generation), registration)
    }

    /// Wraps `future` so it resolves to [`MapError::Aborted`] once superseded.
    pub fn track<T, F>(&mut self, future: F) -> PendingRequest<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (token, registration) = self.issue();
        let future = Abortable::new(future, registration)
            .map(|outcome| outcome.unwrap_or(Err(MapError::Aborted)))
            .boxed();
        PendingRequest { token, future }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Marks `token` as answered. Returns false for stale tokens, whose
    /// results must be discarded.
    pub fn complete(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.in_flight = None;
            true
        } else {
            log::debug!(
                "Discarding stale response (generation {}, current {})",
                token.0,
                self.generation
            );
            false
        }
    }

    /// Aborts the in-flight request, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// A request detached from the widget so the caller can drive it while newer
/// requests are issued.
pub struct PendingRequest<T> {
    token: RequestToken,
    future: BoxFuture<'static, Result<T>>,
}

impl<T> PendingRequest<T> {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub async fn run(self) -> Completed<T> {
        let result = self.future.await;
        Completed {
            token: self.token,
            result,
        }
    }
}

impl<T> std::fmt::Debug for PendingRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`PendingRequest`], still tagged with its token.
#[derive(Debug)]
pub struct Completed<T> {
    pub token: RequestToken,
    pub result: Result<T>,
}
