//! The controlling session.
//!
//! A [`TaskSession`] owns the aggregate store, the filter criteria, the
//! token registry, the last known open file and the scheduler, all behind a
//! single mutex. Editor signals, criteria setters and timer callbacks take
//! that lock, so every mutation is serialized.
//!
//! # Architecture
//!
//! ```text
//! EditorEvent ──► TaskSession ──► RefreshScheduler ──► TimerTicket
//!                     │                                   │ (tokio sleep)
//!                     │◄──────────── on_timer ◄───────────┘
//!                     ▼
//!   RawTaskSource ──► TaskStore::reload_from ──► filter::apply ──► watch
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use taskscope::session::TaskSession;
//! use taskscope::config::SessionConfig;
//!
//! let session = TaskSession::new(&SessionConfig::default(), providers)?;
//! let mut view = session.subscribe();
//! session.select_token("HACK")?;
//! session.line_changed(); // reload in 2s unless another edit arrives
//! ```

mod timers;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, TaskScopeError};
use crate::filter::{self, FilterCriteria};
use crate::host::{ActiveFileProvider, EditorEvent, ProjectFileProvider, RawTaskSource};
use crate::scheduler::{RefreshScheduler, SchedulerPhase, StabilizeOutcome, TimerKind, TimerTicket};
use crate::scope::{Scope, ScopeResolver};
use crate::store::{TaskStore, TaskView};
use crate::task::TaskRecord;
use crate::tokens::{TokenRegistry, ALL_TOKEN};
use timers::TimerSlots;

/// The host collaborators a session pulls from.
#[derive(Clone)]
pub struct Providers {
    pub tasks: Arc<dyn RawTaskSource>,
    pub project: Arc<dyn ProjectFileProvider>,
    pub active: Arc<dyn ActiveFileProvider>,
}

impl Providers {
    /// Bundle the three providers.
    pub fn new(
        tasks: Arc<dyn RawTaskSource>,
        project: Arc<dyn ProjectFileProvider>,
        active: Arc<dyn ActiveFileProvider>,
    ) -> Self {
        Self {
            tasks,
            project,
            active,
        }
    }
}

/// Point-in-time summary of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub selected_token: String,
    pub selected_scope: Scope,
    pub phase: String,
    pub total_tasks: usize,
    pub visible_tasks: usize,
    pub last_reload: Option<DateTime<Utc>>,
}

struct SessionState {
    store: TaskStore,
    criteria: FilterCriteria,
    tokens: TokenRegistry,
    open_file: String,
    scheduler: RefreshScheduler,
    timers: TimerSlots,
    last_reload: Option<DateTime<Utc>>,
}

struct SessionInner {
    state: Mutex<SessionState>,
    providers: Providers,
    runtime: Handle,
}

/// Aggregates, filters and refreshes comment tasks for one editor session.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct TaskSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for TaskSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSession")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl TaskSession {
    /// Create a session and perform the initial reload.
    ///
    /// Must be called from within a tokio runtime; timers are spawned on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no runtime is
    /// available.
    pub fn new(config: &SessionConfig, providers: Providers) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| TaskScopeError::NoRuntime {
            detail: e.to_string(),
        })?;

        let mut tokens = TokenRegistry::new();
        for token in &config.custom_tokens {
            match tokens.add(token) {
                Ok(()) => {}
                Err(TaskScopeError::DuplicateToken { token }) => {
                    debug!("Ignoring duplicate custom token {token}");
                }
                Err(e) => return Err(e),
            }
        }
        let selected = tokens
            .canonical(&config.default_token)
            .unwrap_or(ALL_TOKEN)
            .to_string();

        let state = SessionState {
            store: TaskStore::new(),
            criteria: FilterCriteria::new(selected, config.default_scope),
            tokens,
            open_file: String::new(),
            scheduler: RefreshScheduler::new(config.scheduler_config()),
            timers: TimerSlots::default(),
            last_reload: None,
        };
        let session = Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(state),
                providers,
                runtime,
            }),
        };

        {
            let mut state = session.lock();
            state.open_file = session.inner.resolver().current_file();
            session.inner.reload_and_filter(&mut state);
        }
        Ok(session)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Receiver notified on every replacement of the filtered view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TaskView> {
        self.lock().store.subscribe()
    }

    /// Current filtered view.
    #[must_use]
    pub fn filtered_tasks(&self) -> TaskView {
        self.lock().store.filtered_tasks()
    }

    /// Master list from the last reload.
    #[must_use]
    pub fn all_tasks(&self) -> Vec<TaskRecord> {
        self.lock().store.all_tasks().to_vec()
    }

    /// Current filter criteria.
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        self.lock().criteria.clone()
    }

    /// Registered tokens in display order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.lock().tokens.tokens().to_vec()
    }

    /// Current scheduler phase.
    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        self.lock().scheduler.phase()
    }

    /// Last open file seen by a window activation.
    #[must_use]
    pub fn open_file(&self) -> String {
        self.lock().open_file.clone()
    }

    /// Summary of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            selected_token: state.criteria.selected_token.clone(),
            selected_scope: state.criteria.selected_scope,
            phase: state.scheduler.phase().to_string(),
            total_tasks: state.store.all_tasks().len(),
            visible_tasks: state.store.filtered_tasks().len(),
            last_reload: state.last_reload,
        }
    }

    // =========================================================================
    // Criteria and tokens
    // =========================================================================

    /// Select a registered token and re-filter.
    ///
    /// # Errors
    ///
    /// Returns [`TaskScopeError::UnknownToken`] if the token is not
    /// registered; the selection is left unchanged.
    pub fn select_token(&self, token: &str) -> Result<()> {
        let mut state = self.lock();
        let canonical = state
            .tokens
            .canonical(token)
            .ok_or_else(|| TaskScopeError::UnknownToken {
                token: token.to_string(),
            })?
            .to_string();
        state.criteria.selected_token = canonical;
        self.inner.refilter(&mut state);
        Ok(())
    }

    /// Select a scope and re-filter.
    pub fn select_scope(&self, scope: Scope) {
        let mut state = self.lock();
        state.criteria.selected_scope = scope;
        self.inner.refilter(&mut state);
    }

    /// Register a custom token, select it and reload.
    ///
    /// # Errors
    ///
    /// Propagates the rejection from [`TokenRegistry::add`]; nothing changes.
    pub fn add_token(&self, token: &str) -> Result<()> {
        let mut state = self.lock();
        state.tokens.add(token)?;
        info!("Added token {token}");
        state.criteria.selected_token = token.to_string();
        self.inner.reload_and_filter(&mut state);
        Ok(())
    }

    /// Unregister a custom token and reload. If it was selected, `ALL` is
    /// selected.
    ///
    /// # Errors
    ///
    /// Propagates the rejection from [`TokenRegistry::remove`]; nothing
    /// changes.
    pub fn remove_token(&self, token: &str) -> Result<()> {
        let mut state = self.lock();
        state.tokens.remove(token)?;
        info!("Removed token {token}");
        if state.criteria.selected_token.eq_ignore_ascii_case(token) {
            state.criteria.selected_token = ALL_TOKEN.to_string();
        }
        self.inner.reload_and_filter(&mut state);
        Ok(())
    }

    /// Reload from the source and re-filter immediately.
    pub fn refresh_now(&self) {
        let mut state = self.lock();
        self.inner.reload_and_filter(&mut state);
    }

    // =========================================================================
    // Editor signals
    // =========================================================================

    /// Dispatch a host signal.
    pub fn handle_event(&self, event: EditorEvent) {
        debug!("Editor event: {event}");
        match event {
            EditorEvent::LineChanged => self.line_changed(),
            EditorEvent::WindowActivated => self.window_activated(),
            EditorEvent::SolutionOpened => self.solution_opened(),
            EditorEvent::SolutionBeforeClosing => self.solution_before_closing(),
        }
    }

    /// Drive the session from a channel of host signals until it closes.
    pub async fn pump(&self, mut events: mpsc::Receiver<EditorEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("Editor event stream closed");
    }

    /// An edit happened: restart the debounce timer.
    pub fn line_changed(&self) {
        let mut state = self.lock();
        let ticket = state.scheduler.line_changed();
        self.inner.spawn_timer(&mut state, ticket);
    }

    /// The focused window changed: re-filter if the active file changed.
    pub fn window_activated(&self) {
        let mut state = self.lock();
        let current = self.inner.resolver().current_file();
        if current.to_lowercase() == state.open_file.to_lowercase() {
            return;
        }
        debug!("Active file changed to {current}");
        state.open_file = current;
        self.inner.refilter(&mut state);
    }

    /// A solution opened: poll until the task count settles.
    pub fn solution_opened(&self) {
        let mut state = self.lock();
        let ticket = state.scheduler.solution_opened();
        self.inner.spawn_timer(&mut state, ticket);
    }

    /// The solution is closing: cancel timers and clear everything.
    pub fn solution_before_closing(&self) {
        let mut state = self.lock();
        state.scheduler.solution_closing();
        state.timers.cancel_all();
        state.store.clear();
        info!("Solution closing, task list cleared");
    }
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolver(&self) -> ScopeResolver<'_> {
        ScopeResolver::new(
            self.providers.project.as_ref(),
            self.providers.active.as_ref(),
        )
    }

    /// Re-run the filter over the current master list.
    fn refilter(&self, state: &mut SessionState) {
        let context = self.resolver().resolve(state.criteria.selected_scope);
        let view = filter::apply(state.store.all_tasks(), &state.criteria, &context);
        debug!(
            "Filtered {} of {} tasks (token {}, scope {})",
            view.len(),
            state.store.all_tasks().len(),
            state.criteria.selected_token,
            state.criteria.selected_scope
        );
        state.store.publish(view);
    }

    /// Pull a fresh snapshot, then re-filter. Returns the number of tasks
    /// accepted into the master list.
    ///
    /// A failing source counts as an empty snapshot for this cycle.
    fn reload_and_filter(&self, state: &mut SessionState) -> usize {
        let raw = self.providers.tasks.list_tasks().unwrap_or_else(|e| {
            warn!("Task source unavailable, treating as empty: {e:#}");
            Vec::new()
        });
        let summary = state.store.reload_from(raw);
        if summary.malformed > 0 {
            warn!(
                "Reload kept {} tasks, skipped {} malformed",
                summary.accepted, summary.malformed
            );
        }
        state.last_reload = Some(Utc::now());
        self.refilter(state);
        summary.accepted
    }

    fn spawn_timer(self: &Arc<Self>, state: &mut SessionState, ticket: TimerTicket) {
        let weak: Weak<SessionInner> = Arc::downgrade(self);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(ticket.delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_timer(ticket);
            }
        });
        state.timers.replace(ticket.kind, handle);
    }

    fn on_timer(self: &Arc<Self>, ticket: TimerTicket) {
        let mut state = self.lock();
        if !state.scheduler.begin_fire(&ticket) {
            return;
        }
        state.timers.release(ticket.kind);
        let count = self.reload_and_filter(&mut state);

        match ticket.kind {
            TimerKind::Debounce => state.scheduler.finish_debounce(),
            TimerKind::Stabilize => {
                if let StabilizeOutcome::Retry(next) = state.scheduler.finish_stabilize(count) {
                    debug!(
                        "Task count {count} not settled, retry {} (last seen {})",
                        state.scheduler.retry_count(),
                        state.scheduler.last_observed_count()
                    );
                    self.spawn_timer(&mut state, next);
                }
            }
        }
    }
}
