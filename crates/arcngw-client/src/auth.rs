//! Backend authentication session.
//!
//! One ticket is shared by every request. When it is missing or expired the
//! first caller starts a login and every concurrent caller awaits that same
//! login, so the backend sees exactly one login call per flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arcngw_core::error::Result;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::ports::{Credentials, NgwBackend, Ticket};

type LoginFlight = Shared<BoxFuture<'static, Result<Ticket>>>;

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    LoggingIn,
    Authenticated,
}

#[derive(Default)]
struct SessionInner {
    ticket: Option<Ticket>,
    flight: Option<(u64, LoginFlight)>,
    next_flight: u64,
}

pub struct AuthSession {
    backend: Arc<dyn NgwBackend>,
    credentials: Credentials,
    inner: Mutex<SessionInner>,
}

impl AuthSession {
    pub fn new(backend: Arc<dyn NgwBackend>, credentials: Credentials) -> Self {
        Self { backend, credentials, inner: Mutex::new(SessionInner::default()) }
    }

    // The guard is never held across an await
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        let inner = self.lock();
        if inner.flight.is_some() {
            SessionState::LoggingIn
        } else if inner.ticket.as_ref().is_some_and(|t| t.is_valid_at(Utc::now())) {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Return a valid ticket, logging in if needed
    pub async fn ensure_authenticated(&self) -> Result<Ticket> {
        let (flight_id, flight) = {
            let mut inner = self.lock();
            if let Some(ticket) = inner.ticket.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
                return Ok(ticket.clone());
            }

            match &inner.flight {
                Some((id, flight)) => (*id, flight.clone()),
                None => {
                    let id = inner.next_flight;
                    inner.next_flight += 1;
                    let flight = self.start_login();
                    inner.flight = Some((id, flight.clone()));
                    (id, flight)
                }
            }
        };

        let outcome = flight.await;

        let mut inner = self.lock();
        if matches!(&inner.flight, Some((current, _)) if *current == flight_id) {
            inner.flight = None;
            match &outcome {
                Ok(ticket) => inner.ticket = Some(ticket.clone()),
                Err(e) => tracing::warn!(login = %self.credentials.login, error = %e, "Backend login failed"),
            }
        }

        outcome
    }

    fn start_login(&self) -> LoginFlight {
        let backend = Arc::clone(&self.backend);
        let credentials = self.credentials.clone();

        async move {
            tracing::info!(login = %credentials.login, "Logging in to backend");
            backend.login(&credentials).await
        }
        .boxed()
        .shared()
    }

    /// Forget `rejected` so the next call logs in again.
    ///
    /// A newer ticket obtained in the meantime is kept.
    pub fn invalidate(&self, rejected: &Ticket) {
        let mut inner = self.lock();
        if inner.ticket.as_ref().is_some_and(|t| t.value == rejected.value) {
            tracing::info!("Backend rejected the session ticket; dropping it");
            inner.ticket = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use std::time::Duration;

    fn session(backend: &MemoryBackend) -> AuthSession {
        AuthSession::new(Arc::new(backend.clone()), Credentials::new("admin", "secret"))
    }

    #[tokio::test]
    async fn test_ticket_is_reused() {
        let backend = MemoryBackend::new();
        let session = session(&backend);
        assert_eq!(session.state(), SessionState::Unauthenticated);

        let first = session.ensure_authenticated().await.unwrap();
        let second = session.ensure_authenticated().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.login_calls(), 1);
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_expired_ticket_triggers_login() {
        let backend = MemoryBackend::new();
        backend.set_ticket_lifetime(chrono::TimeDelta::zero());
        let session = session(&backend);

        session.ensure_authenticated().await.unwrap();
        session.ensure_authenticated().await.unwrap();
        assert_eq!(backend.login_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_login() {
        let backend = MemoryBackend::new();
        let session = session(&backend);

        let ticket = session.ensure_authenticated().await.unwrap();
        session.invalidate(&ticket);
        assert_eq!(session.state(), SessionState::Unauthenticated);

        let renewed = session.ensure_authenticated().await.unwrap();
        assert_ne!(renewed, ticket);
        assert_eq!(backend.login_calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_invalidate_keeps_newer_ticket() {
        let backend = MemoryBackend::new();
        let session = session(&backend);

        let old = session.ensure_authenticated().await.unwrap();
        session.invalidate(&old);
        let current = session.ensure_authenticated().await.unwrap();

        session.invalidate(&old);
        assert_eq!(session.ensure_authenticated().await.unwrap(), current);
        assert_eq!(backend.login_calls(), 2);
    }

    #[tokio::test]
    async fn test_state_while_logging_in() {
        let backend = MemoryBackend::new();
        backend.set_login_delay(Duration::from_millis(100));
        let session = Arc::new(session(&backend));

        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.ensure_authenticated().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(session.state(), SessionState::LoggingIn);

        task.await.unwrap().unwrap();
        assert_eq!(session.state(), SessionState::Authenticated);
    }
}
