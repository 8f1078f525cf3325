/*
[INPUT]:  HTTP configuration (project URL, anon key, timeouts, session)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::auth::SessionManager;
use crate::http::{Result, TaskboardError};

const REST_PATH: &str = "rest/v1/";
const AUTH_PATH: &str = "auth/v1/";

/// Query for requests that carry no filters.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Which error body a failed response carries.
#[derive(Debug, Clone, Copy)]
enum ErrorDialect {
    Rest,
    Auth,
}

/// HTTP client for the hosted backend (relational REST + auth).
///
/// Cloning is cheap; clones share the connection pool and the session.
#[derive(Debug, Clone)]
pub struct TaskboardClient {
    http_client: Client,
    base_url: Url,
    anon_key: String,
    session: SessionManager,
}

impl TaskboardClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self> {
        Self::with_config(base_url, anon_key, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        base_url: &str,
        anon_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(TaskboardError::Config("anon key must not be empty".to_string()));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(base_url)?,
            anon_key,
            session: SessionManager::new(),
        })
    }

    /// Share an existing session holder (e.g. one restored by the caller)
    pub fn with_session(mut self, session: SessionManager) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Bearer credential: the signed-in user's access token, or the anon
    /// key when nobody is signed in.
    fn bearer_token(&self) -> String {
        self.session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn with_auth_headers(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.bearer_token()))
            .map_err(|e| TaskboardError::Config(format!("Invalid bearer token: {e}")))?;
        Ok(builder
            .header("apikey", self.anon_key.as_str())
            .header(AUTHORIZATION, bearer))
    }

    /// Build request builder for a table of the relational API
    pub(crate) fn rest_request<Q>(
        &self,
        method: Method,
        table: &str,
        query: &Q,
    ) -> Result<RequestBuilder>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.base_url.join(REST_PATH)?.join(table)?;
        let builder = self.http_client.request(method, url).query(query);
        self.with_auth_headers(builder)
    }

    /// Build request builder for auth endpoints
    pub(crate) fn auth_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(AUTH_PATH)?.join(endpoint)?;
        let builder = self.http_client.request(method, url);
        self.with_auth_headers(builder)
    }

    /// Send a relational API request and decode the JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = Self::checked(builder, ErrorDialect::Rest).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(TaskboardError::from)
    }

    /// Send an auth API request and decode the JSON body
    pub(crate) async fn send_auth_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = Self::checked(builder, ErrorDialect::Auth).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(TaskboardError::from)
    }

    /// Send a request whose body is not needed
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        Self::checked(builder, ErrorDialect::Rest).await.map(|_| ())
    }

    pub(crate) async fn send_auth_empty(&self, builder: RequestBuilder) -> Result<()> {
        Self::checked(builder, ErrorDialect::Auth).await.map(|_| ())
    }

    async fn checked(builder: RequestBuilder, dialect: ErrorDialect) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, body = %body, "backend request rejected");
        Err(match dialect {
            ErrorDialect::Rest => TaskboardError::from_postgrest(status, &body),
            ErrorDialect::Auth => TaskboardError::from_auth(status, &body),
        })
    }

    /// GET rows of a table
    pub(crate) async fn select_rows<T, Q>(&self, table: &str, query: &Q) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.rest_request(Method::GET, table, query)?;
        self.send_json(builder).await
    }

    /// POST rows and return them as stored
    pub(crate) async fn insert_rows<T, B>(&self, table: &str, rows: &[B]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let builder = self
            .rest_request(Method::POST, table, &[("select", "*")])?
            .header("Prefer", "return=representation")
            .json(rows);
        self.send_json(builder).await
    }

    /// PATCH the row with the given id; a row hidden by row-level
    /// security comes back as an empty array and is reported as NotFound.
    pub(crate) async fn update_row<T, B>(
        &self,
        table: &'static str,
        id: impl ToString,
        patch: &B,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let id = id.to_string();
        let builder = self
            .rest_request(Method::PATCH, table, &[("id", eq(&id))])?
            .header("Prefer", "return=representation")
            .json(patch);
        let rows: Vec<T> = self.send_json(builder).await?;
        first_row(table, &id, rows)
    }

    /// DELETE rows matching the filters
    pub(crate) async fn delete_rows<Q>(&self, table: &str, filters: &Q) -> Result<()>
    where
        Q: Serialize + ?Sized,
    {
        let builder = self.rest_request(Method::DELETE, table, filters)?;
        self.send_empty(builder).await
    }
}

/// `eq.<value>` filter operand
pub(crate) fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// `in.(a,b,c)` filter operand
pub(crate) fn in_list<I, T>(values: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    let joined = values
        .into_iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}

pub(crate) fn first_row<T>(table: &'static str, id: &str, rows: Vec<T>) -> Result<T> {
    rows.into_iter().next().ok_or_else(|| TaskboardError::NotFound {
        table,
        id: id.to_string(),
    })
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskboardError::Config("backend url must not be empty".to_string()));
    }
    let mut url = Url::parse(trimmed)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
