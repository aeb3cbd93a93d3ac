use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientConfig,
    error::{ClientError, ValidationError},
    models::{
        session::BearerToken,
        user::{Credentials, LoginResponse, NewAccount},
        Creatable, Lookup, RecordId, Removable, Resource,
    },
};

/// The remote trip store as seen by the view-models.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn list<R: Resource>(
        &self,
        token: &BearerToken,
        scope: &R::Scope,
    ) -> Result<Vec<R>, ClientError>;

    async fn fetch<R: Lookup>(&self, token: &BearerToken, id: &RecordId) -> Result<R, ClientError>;

    /// Returns the created record when the store echoes it back.
    async fn create<R: Creatable>(
        &self,
        token: &BearerToken,
        scope: &R::Scope,
        draft: &R::Draft,
    ) -> Result<Option<R>, ClientError>;

    async fn delete<R: Removable>(
        &self,
        token: &BearerToken,
        scope: &R::Scope,
        id: &RecordId,
    ) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: config.api_base.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }


    pub async fn register(&self, account: &NewAccount) -> Result<(), ClientError> {
        let url = endpoint(&self.base, ["api", "register"])?;
        debug!(%url, "registering account");
        send(self.client.post(url).json(account)).await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        let url = endpoint(&self.base, ["api", "login"])?;
        debug!(%url, "signing in");
        let resp = send(self.client.post(url).json(credentials)).await?;
        decode(resp).await
    }
}

#[async_trait]
impl RemoteStore for ApiClient {
    async fn list<R: Resource>(
        &self,
        token: &BearerToken,
        scope: &R::Scope,
    ) -> Result<Vec<R>, ClientError> {
        let url = endpoint(&self.base, R::collection_path(scope))?;
        debug!(%url, "listing {}", R::LABEL);
        let resp = send(self.client.get(url).bearer_auth(token.as_str())).await?;
        decode(resp).await
    }

    async fn fetch<R: Lookup>(&self, token: &BearerToken, id: &RecordId) -> Result<R, ClientError> {
        let url = endpoint(&self.base, R::lookup_path(id))?;
        debug!(%url, "fetching {}", R::LABEL);
        let resp = send(self.client.get(url).bearer_auth(token.as_str())).await?;
        match decode::<OneOrMany<R>>(resp).await? {
            OneOrMany::One(record) => Ok(record),
            OneOrMany::Many(records) => records.into_iter().next().ok_or(ClientError::NotFound),
        }
    }

    async fn create<R: Creatable>(
        &self,
        token: &BearerToken,
        scope: &R::Scope,
        draft: &R::Draft,
    ) -> Result<Option<R>, ClientError> {
        let url = endpoint(&self.base, R::collection_path(scope))?;
        debug!(%url, "creating {}", R::LABEL);
        let resp = send(
            self.client
                .post(url)
                .bearer_auth(token.as_str())
                .json(draft),
        )
        .await?;
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice::<R>(&body).ok())
    }

    async fn delete<R: Removable>(
        &self,
        token: &BearerToken,
        scope: &R::Scope,
        id: &RecordId,
    ) -> Result<(), ClientError> {
        let url = endpoint(&self.base, R::item_path(scope, id))?;
        debug!(%url, "deleting {}", R::LABEL);
        send(self.client.delete(url).bearer_auth(token.as_str())).await?;
        Ok(())
    }
}

/// Appends `segments` to `base`, escaping each one. Segments that would be
/// dropped or resolved away (`""`, `.`, `..`) are refused.
fn endpoint<I>(base: &Url, segments: I) -> Result<Url, ClientError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let segments: Vec<I::Item> = segments.into_iter().collect();
    if let Some(bad) = segments
        .iter()
        .map(AsRef::as_ref)
        .find(|s| matches!(*s, "" | "." | ".."))
    {
        return Err(ValidationError::InvalidId(bad.to_string()).into());
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::Config(format!("{base} cannot be used as an API base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let resp = request.send().await?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.trim().to_string());
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
