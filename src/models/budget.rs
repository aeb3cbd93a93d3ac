use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{RecordId, Resource};

/// A budget record as the store sends it. The shape is owned by the store,
/// so fields are carried through untouched and never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetEntry(pub Map<String, Value>);

impl BudgetEntry {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl Resource for BudgetEntry {
    type Scope = RecordId;

    const LABEL: &'static str = "Budget entry";

    fn collection_path(trip_id: &RecordId) -> Vec<String> {
        vec!["api".into(), "budget".into(), trip_id.to_string()]
    }
}
