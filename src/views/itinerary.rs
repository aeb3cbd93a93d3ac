use crate::{models::activity::Activity, views::ViewModel};

/// Activities of one trip; the scope is the trip id.
pub type ItineraryView<S> = ViewModel<Activity, S>;
