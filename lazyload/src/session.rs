//! Per-container lazy-load session.
//!
//! A [`Session`] binds the configured events on one container, debounces
//! them, and on every settled burst:
//!
//! 1. scans the remaining candidates against the container box
//! 2. enqueues the newly visible ones as one batch on the shared loader
//! 3. keeps only the still-pending candidates
//! 4. drains the loader
//!
//! Once no candidates remain the session unbinds its listeners and goes
//! dormant. A dormant session never scans again.
//!
//! # Lifetime
//!
//! Bound listeners own the session, so a session stays alive for as long as
//! it can react to events, even if the caller drops its handle. Unbinding
//! (dormancy or [`Session::detach`]) releases it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::LazyLoadConfig;
use crate::error::LazyLoadError;
use crate::fetch::ImageFetcher;
use crate::host::{Host, Listener};
use crate::loader::Loader;
use crate::scanner::scan;
use crate::trigger::Debouncer;

/// Prefix of every session's event namespace.
pub const NAMESPACE_PREFIX: &str = "lazy";

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_session_id() -> u64 {
    SESSION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Summary of one recalculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recalculation {
    /// Candidates queued for loading.
    pub queued: usize,
    /// Visible candidates without a source attribute.
    pub skipped: usize,
    /// Candidates still waiting to become visible.
    pub remaining: usize,
}

#[derive(Debug)]
struct SessionState<E> {
    candidates: Vec<E>,
    debouncer: Debouncer,
    dormant: bool,
}

/// Lazy loading bound to one container.
pub struct Session<H: Host, F: ImageFetcher> {
    id: u64,
    namespace: String,
    container: H::Element,
    config: LazyLoadConfig,
    host: Arc<H>,
    loader: Arc<Loader<H, F>>,
    state: Mutex<SessionState<H::Element>>,
}

impl<H: Host, F: ImageFetcher> Session<H, F> {
    /// Starts lazy loading on `container`.
    ///
    /// Validates `config`, collects the candidates matching its selector,
    /// binds a listener for every configured event and synthesizes one firing
    /// of the first event so images already in view load without waiting
    /// for user interaction. Must be called from within a Tokio runtime.
    pub fn start(
        host: Arc<H>,
        loader: Arc<Loader<H, F>>,
        container: H::Element,
        config: LazyLoadConfig,
    ) -> Result<Arc<Self>, LazyLoadError> {
        config.validate()?;

        let candidates = host.query_selector_all(&container, &config.selector);
        let id = next_session_id();

        let session = Arc::new(Self {
            id,
            namespace: format!("{}-{}", NAMESPACE_PREFIX, id),
            container,
            config,
            host,
            loader,
            state: Mutex::new(SessionState {
                candidates,
                debouncer: Debouncer::with_default_delay(),
                dormant: false,
            }),
        });

        for event in session.config.events() {
            let owner = Arc::clone(&session);
            let listener: Listener = Arc::new(move || owner.on_trigger());
            session
                .host
                .bind(&session.container, event, &session.namespace, listener);
        }

        info!(
            session = session.id,
            container = ?session.container,
            candidates = session.candidates().len(),
            events = %session.config.on,
            "Lazy-load session started"
        );

        if let Some(first) = session.config.first_event() {
            debug!(session = session.id, event = first, "Synthesizing initial trigger");
        }
        session.on_trigger();

        Ok(session)
    }

    /// Handles one firing of a bound event: restarts the debounce timer.
    pub fn on_trigger(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.dormant {
            return;
        }

        let session = Arc::downgrade(self);
        state.debouncer.schedule(move |generation| {
            if let Some(session) = session.upgrade() {
                session.on_settled(generation);
            }
        });
    }

    fn on_settled(&self, generation: u64) {
        if !self.state.lock().debouncer.settle(generation) {
            return;
        }
        self.recalculate();
    }

    /// Scans, enqueues newly visible images and drains the loader.
    ///
    /// Returns `None` if the session is dormant.
    pub fn recalculate(&self) -> Option<Recalculation> {
        let (summary, went_dormant) = {
            let mut state = self.state.lock();
            if state.dormant {
                return None;
            }

            let outcome = scan(
                self.host.as_ref(),
                &self.container,
                &state.candidates,
                &self.config.attribute,
            );

            let summary = Recalculation {
                queued: outcome.visible.len(),
                skipped: outcome.skipped,
                remaining: outcome.pending.len(),
            };

            self.loader.enqueue_batch(outcome.visible);
            state.candidates = outcome.pending;

            let went_dormant = state.candidates.is_empty();
            if went_dormant {
                state.dormant = true;
                state.debouncer.cancel();
            }
            (summary, went_dormant)
        };

        debug!(
            session = self.id,
            queued = summary.queued,
            skipped = summary.skipped,
            remaining = summary.remaining,
            "Visibility recalculated"
        );

        if went_dormant {
            self.host.unbind(&self.container, &self.namespace);
            info!(session = self.id, "All candidates revealed, session dormant");
        }

        self.loader.drain(self.config.drain_settings());
        Some(summary)
    }

    /// Stops the session early: unbinds its listeners and cancels any
    /// pending recalculation. Queued and in-flight loads are unaffected.
    pub fn detach(&self) {
        {
            let mut state = self.state.lock();
            if state.dormant {
                return;
            }
            state.dormant = true;
            state.debouncer.cancel();
        }
        self.host.unbind(&self.container, &self.namespace);
        info!(session = self.id, "Lazy-load session detached");
    }

    /// Candidates not yet revealed, in document order.
    pub fn candidates(&self) -> Vec<H::Element> {
        self.state.lock().candidates.clone()
    }

    /// Returns true once the session stopped listening.
    pub fn is_dormant(&self) -> bool {
        self.state.lock().dormant
    }

    /// Returns true while a debounced recalculation is waiting.
    pub fn is_recalculation_pending(&self) -> bool {
        self.state.lock().debouncer.is_pending()
    }

    /// Event namespace of this session's listeners.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The container this session watches.
    pub fn container(&self) -> &H::Element {
        &self.container
    }

    /// The resolved configuration.
    pub fn config(&self) -> &LazyLoadConfig {
        &self.config
    }
}

impl<H: Host, F: ImageFetcher> std::fmt::Debug for Session<H, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("namespace", &self.namespace)
            .field("container", &self.container)
            .field("candidates", &state.candidates.len())
            .field("dormant", &state.dormant)
            .finish()
    }
}
