use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, NoneAsEmptyString, PickFirst};

use crate::{
    error::ValidationError,
    models::{require_text, Creatable, Lookup, RecordId, Resource},
};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub trip_id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "calendar_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub location: String,
    // The trip form posts the budget as text, so both spellings come back.
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Trip {
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start_date > today
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Case-insensitive substring match on title or location.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.location.to_lowercase().contains(&needle)
    }

    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(0)
    }
}

impl Resource for Trip {
    type Scope = ();

    const LABEL: &'static str = "Trip";

    fn collection_path(_scope: &()) -> Vec<String> {
        vec!["api".into(), "trips".into()]
    }
}

impl Lookup for Trip {
    fn lookup_path(id: &RecordId) -> Vec<String> {
        vec!["api".into(), "trips".into(), id.to_string()]
    }
}

impl Creatable for Trip {
    type Draft = NewTrip;

    fn check_draft(draft: &NewTrip, today: NaiveDate) -> Result<(), ValidationError> {
        draft.validate(today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTrip {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        require_text(&self.title, "Trip title")?;
        require_text(&self.location, "Location")?;
        if self.start_date < today {
            return Err(ValidationError::StartInPast {
                start: self.start_date,
                today,
            });
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
    }
}

/// Purpose choices offered by the trip form; stored in `description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TripPurpose {
    Business,
    Leisure,
    Other,
}

impl TripPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripPurpose::Business => "business",
            TripPurpose::Leisure => "leisure",
            TripPurpose::Other => "other",
        }
    }
}

/// Accepts `2026-10-20` as well as `2026-10-20T00:00:00.000Z`.
fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(start: &str, end: &str) -> NewTrip {
        NewTrip {
            title: "Rome Trip".into(),
            start_date: day(start),
            end_date: day(end),
            location: "Rome".into(),
            budget: None,
            description: None,
        }
    }

    #[test]
    fn accepts_trip_starting_today() {
        assert_eq!(draft("2026-10-16", "2026-10-16").validate(day("2026-10-16")), Ok(()));
    }

    #[test]
    fn rejects_start_in_the_past() {
        let err = draft("2026-10-15", "2026-10-20")
            .validate(day("2026-10-16"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::StartInPast { .. }));
        assert_eq!(err.to_string(), "Start date cannot be in the past.");
    }

    #[test]
    fn rejects_end_before_start() {
        let err = draft("2026-10-20", "2026-10-19")
            .validate(day("2026-10-16"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::EndBeforeStart { .. }));
    }

    #[test]
    fn blank_title_is_missing() {
        let mut trip = draft("2026-10-20", "2026-10-21");
        trip.title = "   ".into();
        assert_eq!(
            trip.validate(day("2026-10-16")),
            Err(ValidationError::MissingField("Trip title"))
        );
    }

    #[test]
    fn decodes_store_variants() {
        let trip: Trip = serde_json::from_value(json!({
            "tripId": 7,
            "title": "Rome Trip",
            "startDate": "2026-10-17T00:00:00.000Z",
            "endDate": "2026-10-20",
            "location": "Rome",
            "budget": "1200",
            "description": "leisure"
        }))
        .unwrap();
        assert_eq!(trip.trip_id, RecordId::from(7));
        assert_eq!(trip.start_date, day("2026-10-17"));
        assert_eq!(trip.budget, Some(1200.0));
        assert_eq!(trip.nights(), 3);

        let bare: Trip = serde_json::from_value(json!({
            "tripId": "abc",
            "startDate": "2026-10-17",
            "endDate": "2026-10-17",
            "budget": ""
        }))
        .unwrap();
        assert_eq!(bare.budget, None);
        assert!(bare.title.is_empty());
    }

    #[test]
    fn draft_uses_store_field_names() {
        let body = serde_json::to_value(draft("2026-10-17", "2026-10-20")).unwrap();
        assert_eq!(body["startDate"], "2026-10-17");
        assert_eq!(body["endDate"], "2026-10-20");
        assert!(body.get("budget").is_none());
    }
}
