use std::sync::Arc;

use crate::{
    auth::CurrentSession,
    clock::{Clock, SystemClock},
    config::ClientConfig,
    error::ClientError,
    models::RecordId,
    services::{api::ApiClient, storage::SessionStore},
    views::{
        budget::BudgetView, itinerary::ItineraryView, trips::TripDetailView, trips::TripsView,
        ViewModel,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub api: Arc<ApiClient>,
    pub sessions: SessionStore,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(&config)?);
        let sessions = SessionStore::new(config.session_dir.clone());
        Ok(Self {
            config,
            api,
            sessions,
            clock,
        })
    }

    pub fn trips_view(&self, session: CurrentSession) -> TripsView<ApiClient> {
        ViewModel::new(self.api.clone(), session, self.clock.clone(), ())
    }

    pub fn trip_detail_view(&self, session: CurrentSession) -> TripDetailView<ApiClient> {
        TripDetailView::new(self.api.clone(), session)
    }

    pub fn itinerary_view(
        &self,
        session: CurrentSession,
        trip_id: RecordId,
    ) -> ItineraryView<ApiClient> {
        ViewModel::new(self.api.clone(), session, self.clock.clone(), trip_id)
    }

    pub fn budget_view(&self, session: CurrentSession, trip_id: RecordId) -> BudgetView<ApiClient> {
        ViewModel::new(self.api.clone(), session, self.clock.clone(), trip_id)
    }
}
