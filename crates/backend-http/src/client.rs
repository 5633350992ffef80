use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use crate::error::{BackendHttpError, Result};
use crate::wire::{ApiErrorBody, ApplyProgramRequest, Workspace};

/// Default timeout for backend requests.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "program-console/0.1";

/// Header carrying the anti-forgery token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// HTTP client for the program endpoints of the streaming backend.
///
/// The client holds no editor state; it only turns calls into requests.
///
/// # Example
/// ```no_run
/// use backend_http::ProgramClient;
///
/// # async fn run() -> backend_http::Result<()> {
/// let client = ProgramClient::builder("http://127.0.0.1:8080").build()?;
/// let workspace = client.get_workspace("3f0c6c8e").await?;
/// println!("{} videos queued", workspace.program.video_ids.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProgramClient {
    client: Client,
    base_url: Url,
    csrf_token: Option<String>,
    timeout: Duration,
}

impl ProgramClient {
    /// Creates a builder targeting `base_url`.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replaces the anti-forgery token sent with state-changing requests.
    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.csrf_token = Some(token.into());
    }

    /// Fetches the editing workspace of one stream.
    pub async fn get_workspace(&self, stream_id: &str) -> Result<Workspace> {
        let url = self.endpoint(&["api", "streams", stream_id, "workspace"])?;
        debug!(%url, "fetching program workspace");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| BackendHttpError::Request {
                context: "send workspace request",
                source,
            })?;
        let body = read_body(response, "read workspace response").await?;

        serde_json::from_str(&body).map_err(|source| BackendHttpError::Decode {
            context: "workspace",
            source,
        })
    }

    /// Saves a program and asks the backend to apply it live.
    pub async fn apply_program(
        &self,
        stream_id: &str,
        request: &ApplyProgramRequest,
    ) -> Result<()> {
        let url = self.endpoint(&["api", "streams", stream_id, "program", "apply"])?;
        debug!(
            %url,
            videos = request.video_ids.len(),
            targets = request.rtmp_targets.len(),
            "applying program"
        );

        let mut builder = self.client.post(url).timeout(self.timeout).json(request);
        if let Some(token) = &self.csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }
        let response = builder
            .send()
            .await
            .map_err(|source| BackendHttpError::Request {
                context: "send apply request",
                source,
            })?;

        read_body(response, "read apply response").await?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendHttpError::InvalidBaseUrl {
                value: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Builder for [`ProgramClient`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    client: Option<Client>,
    timeout: Duration,
    user_agent: String,
    csrf_token: Option<String>,
}

impl ClientBuilder {
    /// Creates a builder with default timeout and User-Agent.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            csrf_token: None,
        }
    }

    /// Reuses an existing reqwest client (connection pool, proxy settings).
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the anti-forgery token sent with state-changing requests.
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Validates the base URL and builds the client.
    pub fn build(self) -> Result<ProgramClient> {
        let base_url = Url::parse(self.base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(BackendHttpError::InvalidBaseUrl {
                value: self.base_url,
            });
        }

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()
                .map_err(BackendHttpError::ClientBuild)?,
        };

        Ok(ProgramClient {
            client,
            base_url,
            csrf_token: self.csrf_token.filter(|token| !token.trim().is_empty()),
            timeout: self.timeout,
        })
    }
}

async fn read_body(response: Response, context: &'static str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| BackendHttpError::Request { context, source })?;

    if !status.is_success() {
        let message = error_message(status.as_u16(), &body);
        warn!(status = status.as_u16(), %message, "backend rejected request");
        return Err(BackendHttpError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("Request failed with status {status}"))
}
