use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::fs;

use crate::{error::ClientError, models::session::Session};

const SESSION_FILE: &str = "session.json";

/// Keeps the signed-in session across runs, one JSON file per profile dir.
#[derive(Clone)]
pub struct SessionStore {
    root: Arc<PathBuf>,
}

impl SessionStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self) -> PathBuf {
        self.root().join(SESSION_FILE)
    }

    pub async fn load(&self) -> Result<Option<Session>, ClientError> {
        let path = self.session_path();
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let raw = fs::read(&path).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        let session: Session = serde_json::from_slice(&raw)?;
        Ok(Some(session))
    }

    pub async fn save(&self, session: &Session) -> Result<(), ClientError> {
        fs::create_dir_all(self.root()).await?;
        let data = serde_json::to_vec_pretty(session)?;
        fs::write(self.session_path(), data).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        let path = self.session_path();
        if fs::try_exists(&path).await? {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}
