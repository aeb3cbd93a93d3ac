//! Headless view-models. Each one owns the snapshot a screen renders, keeps it
//! in sync with the remote store and publishes changes on a watch channel.

pub mod budget;
pub mod itinerary;
pub mod trips;

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    auth::CurrentSession,
    clock::Clock,
    error::ClientError,
    models::{session::BearerToken, Creatable, RecordId, Removable, Resource},
    services::api::RemoteStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient, user-visible message about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewState<R> {
    pub items: Vec<R>,
    pub loading: bool,
    /// At least one fetch has completed.
    pub loaded: bool,
    pub notice: Option<Notice>,
}

impl<R> Default for ViewState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            loaded: false,
            notice: None,
        }
    }
}

/// What a list screen should show for a given state.
#[derive(Debug, PartialEq)]
pub enum Presentation<'a, R> {
    Loading,
    Empty,
    List(&'a [R]),
}

impl<R> ViewState<R> {
    pub fn presentation(&self) -> Presentation<'_, R> {
        if self.loading {
            Presentation::Loading
        } else if self.items.is_empty() {
            Presentation::Empty
        } else {
            Presentation::List(&self.items)
        }
    }
}

/// Cancelled when the owning view goes away; late responses are dropped.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime(CancellationToken);

impl ViewLifetime {
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        tokio::select! {
            biased;
            _ = self.0.cancelled() => Err(ClientError::Cancelled),
            res = fut => res,
        }
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

pub struct ViewModel<R: Resource, S> {
    store: Arc<S>,
    session: CurrentSession,
    clock: Arc<dyn Clock>,
    scope: R::Scope,
    state: watch::Sender<ViewState<R>>,
    lifetime: ViewLifetime,
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl<R: Resource, S: RemoteStore> ViewModel<R, S> {
    pub fn new(
        store: Arc<S>,
        session: CurrentSession,
        clock: Arc<dyn Clock>,
        scope: R::Scope,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            store,
            session,
            clock,
            scope,
            state,
            lifetime: ViewLifetime::default(),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn scope(&self) -> &R::Scope {
        &self.scope
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<R>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState<R> {
        self.state.borrow().clone()
    }

    pub async fn mount(&self) -> Result<Vec<R>, ClientError> {
        self.fetch_all().await
    }

    pub fn teardown(&self) {
        self.lifetime.cancel();
    }

    /// Replaces the snapshot with the store's list for this scope. On failure
    /// the previous snapshot stays in place.
    ///
    /// Only the most recently started fetch writes the snapshot. A fetch that
    /// was overtaken by a newer fetch or a mutation returns the snapshot as it
    /// stands, not the list it received.
    pub async fn fetch_all(&self) -> Result<Vec<R>, ClientError> {
        let token = self.token().map_err(|err| self.fail(err))?;
        let generation = self.next_generation();
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| s.loading = true);

        let result = self
            .lifetime
            .guard(self.store.list::<R>(&token, &self.scope))
            .await;
        let settled = self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1;
        if self.lifetime.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let current = self.is_current(generation);

        match result {
            Ok(items) if current => {
                let snapshot = items.clone();
                self.state.send_modify(|s| {
                    s.items = snapshot;
                    s.loading = !settled;
                    s.loaded = true;
                });
                Ok(items)
            }
            Ok(_) => {
                debug!("discarding stale {} list", R::LABEL);
                self.state.send_modify(|s| s.loading = !settled);
                Ok(self.state.borrow().items.clone())
            }
            Err(err) => {
                self.state.send_modify(|s| s.loading = !settled);
                if current {
                    Err(self.fail(err))
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Background refresh after a mutation. Failures keep the local snapshot.
    async fn reconcile(&self, token: &BearerToken) {
        let generation = self.next_generation();
        let result = self
            .lifetime
            .guard(self.store.list::<R>(token, &self.scope))
            .await;
        if self.lifetime.is_cancelled() || !self.is_current(generation) {
            return;
        }
        match result {
            Ok(items) => self.state.send_modify(|s| {
                s.items = items;
                s.loaded = true;
            }),
            Err(err) => {
                warn!(error = %err, "could not refresh {} list, keeping local copy", R::LABEL);
            }
        }
    }

    fn token(&self) -> Result<BearerToken, ClientError> {
        Ok(self.session.require()?.token.clone())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn notify(&self, notice: Notice) {
        self.state.send_modify(|s| s.notice = Some(notice));
    }

    fn fail(&self, err: ClientError) -> ClientError {
        if !err.is_cancelled() {
            warn!(error = %err, "{} action failed", R::LABEL);
            self.notify(Notice::error(err.user_message()));
        }
        err
    }
}

impl<R: Creatable, S: RemoteStore> ViewModel<R, S> {
    /// Validates locally, posts, then reconciles with the store. The created
    /// record is shown right away when the store echoes it.
    pub async fn create(&self, draft: R::Draft) -> Result<(), ClientError> {
        R::check_draft(&draft, self.clock.today()).map_err(|err| self.fail(err.into()))?;
        let token = self.token().map_err(|err| self.fail(err))?;

        let created = self
            .lifetime
            .guard(self.store.create::<R>(&token, &self.scope, &draft))
            .await
            .map_err(|err| self.fail(err))?;
        if self.lifetime.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        self.next_generation();
        self.state.send_modify(|s| {
            if let Some(record) = created {
                s.items.push(record);
            }
            s.notice = Some(Notice::success(format!("{} created successfully!", R::LABEL)));
        });
        info!(scope = ?self.scope, "{} created", R::LABEL);

        self.reconcile(&token).await;
        Ok(())
    }
}

impl<R: Removable, S: RemoteStore> ViewModel<R, S> {
    /// Removes the record locally first and restores it if the store refuses.
    pub async fn remove(&self, id: &RecordId) -> Result<(), ClientError> {
        let token = self.token().map_err(|err| self.fail(err))?;

        self.next_generation();
        let mut taken = None;
        self.state.send_modify(|s| {
            if let Some(pos) = s.items.iter().position(|record| record.id() == id) {
                taken = Some((pos, s.items.remove(pos)));
            }
        });

        let result = self
            .lifetime
            .guard(self.store.delete::<R>(&token, &self.scope, id))
            .await;

        if let Err(err) = result {
            if let Some((pos, record)) = taken {
                // A fetch that landed meanwhile may already show it again.
                self.state.send_if_modified(|s| {
                    if s.items.iter().any(|r| r.id() == id) {
                        return false;
                    }
                    let pos = pos.min(s.items.len());
                    s.items.insert(pos, record);
                    true
                });
            }
            return Err(self.fail(err));
        }
        if self.lifetime.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        self.notify(Notice::success(format!("{} deleted", R::LABEL)));
        info!(scope = ?self.scope, %id, "{} deleted", R::LABEL);
        self.reconcile(&token).await;
        Ok(())
    }
}

impl<R: Resource, S> Drop for ViewModel<R, S> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
