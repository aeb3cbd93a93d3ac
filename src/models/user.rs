use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    models::{require_text, session::BearerToken, RecordId},
};

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "PhoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "Name")?;
        require_text(&self.email, "Email")?;
        require_text(&self.password, "Password")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: BearerToken,
    pub user: AccountProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountProfile {
    pub id: RecordId,
    pub name: String,
    pub email: String,
}
