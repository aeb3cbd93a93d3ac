use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    models::{require_text, Creatable, RecordId, Removable, Resource},
};

/// One itinerary entry. The trip it belongs to is implied by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: RecordId,
    #[serde(default, alias = "time")]
    pub start_time: String,
    #[serde(default, alias = "description")]
    pub name: String,
}

impl Activity {
    /// `"09:30 AM"`; the hour itself is not converted to a 12-hour clock.
    pub fn clock_label(&self) -> String {
        let mut parts = self.start_time.split(':');
        let hour = parts.next().unwrap_or_default();
        let minute = parts.next().unwrap_or_default();
        let meridiem = match hour.parse::<u32>() {
            Ok(h) if h >= 12 => "PM",
            _ => "AM",
        };
        format!("{hour}:{minute} {meridiem}")
    }
}

impl Resource for Activity {
    type Scope = RecordId;

    const LABEL: &'static str = "Activity";

    fn collection_path(trip_id: &RecordId) -> Vec<String> {
        vec!["api".into(), "activities".into(), trip_id.to_string()]
    }
}

impl Removable for Activity {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn item_path(trip_id: &RecordId, id: &RecordId) -> Vec<String> {
        let mut path = Self::collection_path(trip_id);
        path.push(id.to_string());
        path
    }
}

impl Creatable for Activity {
    type Draft = NewActivity;

    fn check_draft(draft: &NewActivity, _today: NaiveDate) -> Result<(), ValidationError> {
        require_text(&draft.time, "Time")?;
        require_text(&draft.description, "Description")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewActivity {
    pub time: String,
    pub description: String,
}

impl NewActivity {
    pub fn new(time: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            description: description.into(),
        }
    }
}
