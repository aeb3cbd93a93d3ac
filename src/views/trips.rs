use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::warn;

use crate::{
    auth::CurrentSession,
    error::ClientError,
    models::{trip::Trip, RecordId},
    services::api::RemoteStore,
    views::{ViewLifetime, ViewModel},
};

pub type TripsView<S> = ViewModel<Trip, S>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TripFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

/// Search box plus filter dropdown of the trips page.
#[derive(Debug, Clone, Default)]
pub struct TripQuery {
    pub search: String,
    pub filter: TripFilter,
}

impl TripQuery {
    pub fn apply<'a>(&self, trips: &'a [Trip], today: NaiveDate) -> Vec<&'a Trip> {
        trips
            .iter()
            .filter(|trip| trip.matches(&self.search))
            .filter(|trip| match self.filter {
                TripFilter::All => true,
                TripFilter::Upcoming => trip.is_upcoming(today),
                TripFilter::Past => trip.is_past(today),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripSummary {
    pub total: usize,
    pub upcoming: usize,
    pub past: usize,
}

impl TripSummary {
    pub fn of(trips: &[Trip], today: NaiveDate) -> Self {
        Self {
            total: trips.len(),
            upcoming: trips.iter().filter(|t| t.is_upcoming(today)).count(),
            past: trips.iter().filter(|t| t.is_past(today)).count(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub trip: Option<Trip>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Single-trip screen.
pub struct TripDetailView<S> {
    store: Arc<S>,
    session: CurrentSession,
    state: watch::Sender<DetailState>,
    lifetime: ViewLifetime,
}

impl<S: RemoteStore> TripDetailView<S> {
    pub fn new(store: Arc<S>, session: CurrentSession) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            store,
            session,
            state,
            lifetime: ViewLifetime::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn teardown(&self) {
        self.lifetime.cancel();
    }

    pub async fn load(&self, trip_id: &RecordId) -> Result<Trip, ClientError> {
        let token = match self.session.require() {
            Ok(session) => session.token.clone(),
            Err(err) => {
                self.state.send_modify(|s| s.error = Some(err.user_message()));
                return Err(err);
            }
        };
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .lifetime
            .guard(self.store.fetch::<Trip>(&token, trip_id))
            .await;
        if self.lifetime.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        match result {
            Ok(trip) => {
                let shown = trip.clone();
                self.state.send_modify(|s| {
                    s.trip = Some(shown);
                    s.loading = false;
                });
                Ok(trip)
            }
            Err(err) => {
                warn!(error = %err, %trip_id, "failed to load trip details");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some("Failed to load trip details.".into());
                });
                Err(err)
            }
        }
    }
}

impl<S> Drop for TripDetailView<S> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
