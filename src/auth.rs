use tracing::info;

use crate::{
    error::ClientError,
    models::{
        session::Session,
        user::{Credentials, NewAccount},
    },
    state::AppState,
};

/// The signed-in session, if any. Handed to every view-model explicitly.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn signed_in(session: Session) -> Self {
        Self(Some(session))
    }

    pub fn require(&self) -> Result<&Session, ClientError> {
        self.0.as_ref().ok_or(ClientError::Unauthenticated)
    }

    pub fn is_signed_in(&self) -> bool {
        self.0.is_some()
    }
}

pub async fn register_user(state: &AppState, account: &NewAccount) -> Result<(), ClientError> {
    account.validate()?;
    state.api.register(account).await?;
    info!(email = %account.email, "account created");
    Ok(())
}

/// Signs in and persists the session so later runs pick it up.
pub async fn login(state: &AppState, credentials: &Credentials) -> Result<Session, ClientError> {
    let response = state.api.login(credentials).await?;
    let session = Session {
        user_id: response.user.id,
        display_name: response.user.name,
        email: response.user.email,
        token: response.token,
    };
    state.sessions.save(&session).await?;
    info!(user = %session.user_id, "signed in");
    Ok(session)
}

pub async fn logout(state: &AppState) -> Result<(), ClientError> {
    state.sessions.clear().await?;
    info!("signed out");
    Ok(())
}

pub async fn restore(state: &AppState) -> Result<CurrentSession, ClientError> {
    Ok(CurrentSession(state.sessions.load().await?))
}
