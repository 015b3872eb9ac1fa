//! The session store: single source of truth for who is logged in.
//!
//! One store exists per client. It owns the in-memory [`Session`] and the
//! persisted bearer token, and publishes every change through a
//! `tokio::sync::watch` channel. Pages and guards never hold their own copy
//! of the session; they read it through a [`SessionView`].
//!
//! # Lifecycle
//!
//! ```text
//! new() ──→ bootstrap() ──→ login() / logout() / refresh_user() ... ──→ dispose()
//! ```
//!
//! # Concurrency
//!
//! `login` and `logout` are synchronous and apply immediately. Bootstrap and
//! refresh serialize on an async mutex, so two fetches are never in flight
//! for the same store. A fetch result is applied only if nothing replaced
//! the session while it was outstanding (tracked by a generation counter)
//! and the store has not been disposed. The generation check and the
//! publish that follows it happen under the same lock `login` and `logout`
//! take, so a result can never land on top of a newer session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gatehouse_protocol::User;
use tokio::sync::{broadcast, watch};

use crate::{AuthApi, FetchError, Session, SessionConfig, SessionEvent, TokenStorage};

/// Capacity of the telemetry event channel. Slow subscribers lag; they
/// never block the store.
const EVENT_CAPACITY: usize = 64;

/// Handle to a session store. Cheap to clone; all clones share one session.
pub struct SessionStore<A: AuthApi, S: TokenStorage> {
    inner: Arc<Inner<A, S>>,
}

impl<A: AuthApi, S: TokenStorage> Clone for SessionStore<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<A, S> {
    config: SessionConfig,
    api: A,
    storage: S,

    /// Every session change goes through this lock.
    state: Mutex<Transitions>,
    /// Kept so snapshots stay readable after dispose.
    snapshot: watch::Receiver<Session>,

    events: broadcast::Sender<SessionEvent>,

    /// Serializes bootstrap and refresh.
    fetch_lock: tokio::sync::Mutex<()>,
    bootstrapped: AtomicBool,
    disposed: AtomicBool,
    last_error: Mutex<Option<String>>,
}

struct Transitions {
    /// Publisher side of the session. `None` once disposed, which closes
    /// every `SessionView`.
    publisher: Option<watch::Sender<Session>>,
    /// Bumped by every `login` / `logout`; a fetch that started under an
    /// older generation is stale.
    generation: u64,
    /// A bootstrap or refresh is waiting on the API. While set, only the
    /// fetch itself may clear `is_loading`.
    fetching: bool,
}

impl Transitions {
    /// Applies `apply` to the published session. Observers are woken only
    /// if the snapshot actually changed.
    fn publish(&self, apply: impl FnOnce(&mut Session)) {
        if let Some(publisher) = &self.publisher {
            publisher.send_if_modified(|session| {
                let before = session.clone();
                apply(session);
                *session != before
            });
        }
    }

    fn is_closed(&self) -> bool {
        self.publisher.is_none()
    }
}

/// Marks a fetch as in flight. If the refresh future is dropped before the
/// fetch returns, the flag is cleared and loading ends.
struct InFlight<'a> {
    state: &'a Mutex<Transitions>,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a Mutex<Transitions>, guard: &mut Transitions) -> Self {
        guard.fetching = true;
        guard.publish(|session| session.is_loading = true);
        Self { state }
    }

    /// The fetch returned; the caller takes over the flag.
    fn finish(self) {
        std::mem::forget(self);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.fetching {
            state.fetching = false;
            state.publish(|session| session.is_loading = false);
        }
    }
}

impl<A: AuthApi, S: TokenStorage> SessionStore<A, S> {
    /// Creates a store in the `Bootstrapping` state.
    ///
    /// Nothing is read from storage until [`bootstrap`](Self::bootstrap)
    /// runs, so observers can subscribe first and see `is_loading = true`.
    pub fn new(config: SessionConfig, storage: S, api: A) -> Self {
        let (publisher, snapshot) = watch::channel(Session::bootstrapping());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                config,
                api,
                storage,
                state: Mutex::new(Transitions {
                    publisher: Some(publisher),
                    generation: 0,
                    fetching: false,
                }),
                snapshot,
                events,
                fetch_lock: tokio::sync::Mutex::new(()),
                bootstrapped: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                last_error: Mutex::new(None),
            }),
        }
    }

    // -- Reading ------------------------------------------------------------

    /// Current snapshot.
    pub fn session(&self) -> Session {
        self.inner.snapshot.borrow().clone()
    }

    /// A read-only, change-notifying view of the session.
    pub fn view(&self) -> SessionView {
        SessionView {
            rx: self.inner.snapshot.clone(),
        }
    }

    /// Subscribes to telemetry events emitted from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Why the most recent refresh failed, if it did. Cleared by the next
    /// successful refresh or login.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner.last_error).clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The collaborator this store fetches identities from.
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    // -- Transitions ----------------------------------------------------------

    /// Persists `token` and sets `user` as the logged-in identity.
    ///
    /// Storage failures are logged, not returned: the in-memory session is
    /// still updated, it just won't survive a restart. A fetch in flight
    /// keeps `is_loading` set until it returns and is discarded.
    ///
    /// # Panics
    /// If the store has been disposed.
    pub fn login(&self, token: &str, user: User) {
        self.assert_live("login");
        let user_id = user.id.clone();

        let mut state = lock(&self.inner.state);
        state.generation += 1;
        if let Err(e) = self.inner.storage.set(&self.inner.config.token_key, token) {
            tracing::warn!(error = %e, "failed to persist bearer token");
        }
        state.publish(|session| session.user = Some(user));
        *lock(&self.inner.last_error) = None;

        tracing::info!(%user_id, "logged in");
        self.emit(SessionEvent::LoggedIn(user_id));
    }

    /// Deletes the persisted token and clears the user. Idempotent.
    ///
    /// # Panics
    /// If the store has been disposed.
    pub fn logout(&self) {
        self.assert_live("logout");
        let mut state = lock(&self.inner.state);
        state.generation += 1;
        self.clear_session(&state);
    }

    /// Re-fetches the current user with the persisted token.
    ///
    /// Never fails from the caller's point of view. On success the user is
    /// replaced; on any failure the session is reset to anonymous (token
    /// deleted) and the reason is recorded in [`last_error`](Self::last_error).
    pub async fn refresh_user(&self) {
        let _fetching = self.inner.fetch_lock.lock().await;
        self.refresh_locked().await;
    }

    /// Restores the session from storage. Runs once per store.
    ///
    /// Without a persisted token this settles to anonymous immediately and
    /// never calls the API. With one, it runs the refresh path. Either way
    /// `is_loading` becomes `false` when this returns.
    ///
    /// # Panics
    /// If called a second time.
    pub async fn bootstrap(&self) {
        assert!(
            !self.inner.bootstrapped.swap(true, Ordering::SeqCst),
            "SessionStore::bootstrap must run exactly once per store"
        );
        let _fetching = self.inner.fetch_lock.lock().await;

        if self.read_token().is_some() {
            tracing::debug!("persisted token found, fetching current user");
            self.refresh_locked().await;
        } else {
            tracing::info!("no persisted token, starting anonymous");
            lock(&self.inner.state).publish(|session| session.is_loading = false);
        }

        if !self.is_disposed() {
            self.emit(SessionEvent::Settled);
        }
    }

    /// Ends the store's lifecycle.
    ///
    /// Fetches still in flight are discarded when they complete, every
    /// [`SessionView`] observes the close, and further `login` / `logout`
    /// calls panic. The persisted token is left as is.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        lock(&self.inner.state).publisher.take();
        tracing::debug!("session store disposed");
    }

    // -- Internals ------------------------------------------------------------

    /// The refresh path. Caller holds `fetch_lock`.
    async fn refresh_locked(&self) {
        let (generation, in_flight) = {
            let mut state = lock(&self.inner.state);
            if state.is_closed() {
                return;
            }
            let in_flight = InFlight::start(&self.inner.state, &mut state);
            (state.generation, in_flight)
        };

        let outcome = match self.read_token() {
            Some(token) => self.inner.api.current_user(&token).await,
            None => Err(FetchError::MissingToken),
        };

        in_flight.finish();
        let mut state = lock(&self.inner.state);
        state.fetching = false;

        if state.is_closed() {
            tracing::debug!("store disposed during fetch, discarding result");
            return;
        }
        if state.generation != generation {
            // login/logout replaced the session while we were waiting;
            // their state wins.
            tracing::debug!("session changed during fetch, discarding result");
            state.publish(|session| session.is_loading = false);
            return;
        }

        match outcome {
            Ok(user) => {
                let user_id = user.id.clone();
                state.publish(|session| {
                    session.user = Some(user);
                    session.is_loading = false;
                });
                *lock(&self.inner.last_error) = None;
                tracing::debug!(%user_id, "current user refreshed");
                self.emit(SessionEvent::Refreshed(user_id));
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(error = %reason, "current user fetch failed, logging out");
                *lock(&self.inner.last_error) = Some(reason.clone());
                state.generation += 1;
                self.clear_session(&state);
                self.emit(SessionEvent::RefreshFailed { reason });
            }
        }
    }

    /// Deletes the token and publishes an anonymous session in one update.
    /// `is_loading` is cleared too unless a fetch is still waiting.
    fn clear_session(&self, state: &Transitions) {
        if let Err(e) = self.inner.storage.delete(&self.inner.config.token_key) {
            tracing::warn!(error = %e, "failed to delete bearer token");
        }
        let was_authenticated = self.inner.snapshot.borrow().is_authenticated();
        let settle = !state.fetching;
        state.publish(|session| {
            session.user = None;
            if settle {
                session.is_loading = false;
            }
        });
        if was_authenticated {
            tracing::info!("logged out");
        }
        self.emit(SessionEvent::LoggedOut);
    }

    fn read_token(&self) -> Option<String> {
        match self.inner.storage.get(&self.inner.config.token_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read bearer token, treating as absent");
                None
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn assert_live(&self, op: &str) {
        assert!(
            !self.is_disposed(),
            "SessionStore::{op} called after dispose"
        );
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// Read-only observer of a store's session.
///
/// Every clone tracks "seen" state independently, so each page or guard
/// can hold its own view.
#[derive(Debug, Clone)]
pub struct SessionView {
    rx: watch::Receiver<Session>,
}

impl SessionView {
    /// Current snapshot, without marking it as seen.
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    /// Current snapshot, marking it as seen so [`changed`](Self::changed)
    /// waits for the next update.
    pub fn observe(&mut self) -> Session {
        self.rx.borrow_and_update().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.rx.borrow().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    /// Waits for the next update and returns it.
    ///
    /// Returns `None` once the store has been disposed or dropped.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until nothing is loading and returns that snapshot.
    ///
    /// If the store goes away first, returns the last snapshot it published.
    pub async fn settled(&mut self) -> Session {
        let settled = self
            .rx
            .wait_for(|session| !session.is_loading)
            .await
            .map(|session| session.clone());
        settled.unwrap_or_else(|_| self.current())
    }
}
