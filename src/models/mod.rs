pub mod activity;
pub mod budget;
pub mod id;
pub mod session;
pub mod trip;
pub mod user;

use std::fmt;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ValidationError;

pub use id::RecordId;

/// A collection the remote store serves, partitioned by `Scope`.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    type Scope: fmt::Debug + Clone + Send + Sync + 'static;

    /// Human label used in notices, e.g. "Trip".
    const LABEL: &'static str;

    /// Path segments below the API base. Each one is escaped on its own, so
    /// ids may contain `/`, `#` or `?`.
    fn collection_path(scope: &Self::Scope) -> Vec<String>;
}

pub trait Creatable: Resource {
    type Draft: Serialize + fmt::Debug + Send + Sync + 'static;

    /// Local checks run before anything is sent.
    fn check_draft(draft: &Self::Draft, today: NaiveDate) -> Result<(), ValidationError>;
}

pub trait Removable: Resource {
    fn id(&self) -> &RecordId;

    fn item_path(scope: &Self::Scope, id: &RecordId) -> Vec<String>;
}

pub trait Lookup: Resource {
    fn lookup_path(id: &RecordId) -> Vec<String>;
}

/// Shallow presence check shared by the drafts.
pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
