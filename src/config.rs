use std::{env, path::PathBuf, time::Duration};

use url::Url;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: Url,
    pub session_dir: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        let api_base = env::var("ITINERA_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/".to_string());
        let api_base = parse_base_url(&api_base)?;

        let session_dir = env::var("ITINERA_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".itinera"));

        let timeout_secs: u64 = env::var("ITINERA_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|err| ClientError::Config(format!("invalid ITINERA_TIMEOUT_SECS: {err}")))?;

        Ok(Self {
            api_base,
            session_dir,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_base(api_base: &str, session_dir: PathBuf) -> Result<Self, ClientError> {
        Ok(Self {
            api_base: parse_base_url(api_base)?,
            session_dir,
            request_timeout: Duration::from_secs(10),
        })
    }
}

/// `Url::join` drops the last path segment unless the base ends with a slash.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw)
        .map_err(|err| ClientError::Config(format!("invalid ITINERA_API_URL: {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
