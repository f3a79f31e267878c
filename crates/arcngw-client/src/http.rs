//! reqwest adapter for the NextGIS Web API.

use std::time::Duration;

use async_trait::async_trait;
use arcngw_core::config::BackendConfig;
use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::{FeaturePayload, FeatureTarget};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;

use crate::ports::{
    BackendReply, Credentials, IdentifyRequest, ImageReply, NgwBackend, RenderRequest, Ticket,
};

const TICKET_COOKIE: &str = "tkt";

/// NextGIS Web backend reached over HTTP
pub struct HttpBackend {
    /// Base URL without trailing slash (e.g., "https://demo.nextgis.com")
    host: String,

    /// Lifetime assumed for tickets whose cookie carries no expiry
    ticket_ttl: TimeDelta,

    /// Pooled HTTP client; its timeout bounds every call
    client: reqwest::Client,

    /// Client for the login form only; it does not follow redirects so the
    /// ticket cookie on the redirect response stays readable
    login_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let ticket_ttl =
            TimeDelta::from_std(config.ticket_ttl).map_err(|e| NgwError::ConfigInvalid {
                key: "ARCNGW_TICKET_TTL_SECS".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            host: config.host.clone(),
            ticket_ttl,
            client: build_client(config.request_timeout, Policy::default())?,
            login_client: build_client(config.request_timeout, Policy::none())?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path)
    }

    fn authorized(&self, request: RequestBuilder, ticket: &Ticket) -> RequestBuilder {
        request.header(header::COOKIE, format!("{}={}", TICKET_COOKIE, ticket.value))
    }
}

fn build_client(timeout: Duration, redirect: Policy) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .redirect(redirect)
        .build()
        .map_err(|e| NgwError::ConfigInvalid {
            key: "ARCNGW_REQUEST_TIMEOUT_SECS".to_string(),
            reason: format!("Failed to build HTTP client: {}", e),
        })
}

fn transport(err: reqwest::Error) -> NgwError {
    NgwError::Transport { reason: err.to_string(), timed_out: err.is_timeout() }
}

/// Read a JSON reply; bodies that are not JSON are kept as text
async fn read_reply(response: Response) -> Result<BackendReply> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(transport)?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        }
    };

    Ok(BackendReply { status, body })
}

/// Pick the ticket out of the `Set-Cookie` headers of a login response.
///
/// `Max-Age` wins over `Expires`; with neither the ticket lives for `ttl`.
pub fn ticket_from_cookies<'a>(
    set_cookies: impl IntoIterator<Item = &'a str>,
    now: DateTime<Utc>,
    ttl: TimeDelta,
) -> Option<Ticket> {
    set_cookies.into_iter().find_map(|cookie| {
        let mut attributes = cookie.split(';').map(str::trim);
        let (name, value) = attributes.next()?.split_once('=')?;
        if name.trim() != TICKET_COOKIE || value.is_empty() {
            return None;
        }

        let mut max_age = None;
        let mut expires = None;
        for attribute in attributes {
            let (key, raw) = attribute.split_once('=').unwrap_or((attribute, ""));
            if key.eq_ignore_ascii_case("max-age") {
                max_age = raw.trim().parse::<i64>().ok().and_then(TimeDelta::try_seconds);
            } else if key.eq_ignore_ascii_case("expires") {
                expires = DateTime::parse_from_rfc2822(raw.trim())
                    .ok()
                    .map(|at| at.with_timezone(&Utc));
            }
        }

        let expires_at = match (max_age, expires) {
            (Some(age), _) => now.checked_add_signed(age).unwrap_or(DateTime::<Utc>::MAX_UTC),
            (None, Some(at)) => at,
            (None, None) => now + ttl,
        };
        Some(Ticket::new(value.trim_matches('"'), expires_at))
    })
}

#[async_trait]
impl NgwBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Ticket> {
        let response = self
            .login_client
            .post(self.url("login"))
            .form(&[
                ("login", credentials.login.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(NgwError::Auth {
                reason: format!("login returned {} response status code", status.as_u16()),
            });
        }

        let cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok());

        ticket_from_cookies(cookies, Utc::now(), self.ticket_ttl).ok_or_else(|| NgwError::Auth {
            reason: "login response carried no ticket cookie".to_string(),
        })
    }

    async fn get_resource(&self, ticket: &Ticket, resource_id: u64) -> Result<BackendReply> {
        let url = self.url(&format!("api/resource/{}", resource_id));
        tracing::debug!(resource_id, "Fetching resource");

        let response =
            self.authorized(self.client.get(url), ticket).send().await.map_err(transport)?;
        read_reply(response).await
    }

    async fn save_feature(
        &self,
        ticket: &Ticket,
        target: FeatureTarget,
        payload: &FeaturePayload,
    ) -> Result<BackendReply> {
        let request = match target.feature_id {
            Some(id) => self
                .client
                .put(self.url(&format!("api/resource/{}/feature/{}", target.layer, id))),
            None => self.client.post(self.url(&format!("api/resource/{}/feature/", target.layer))),
        };

        let response =
            self.authorized(request, ticket).json(payload).send().await.map_err(transport)?;
        read_reply(response).await
    }

    async fn identify(&self, ticket: &Ticket, request: &IdentifyRequest) -> Result<BackendReply> {
        let response = self
            .authorized(self.client.post(self.url("feature_layer/identify")), ticket)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_reply(response).await
    }

    async fn render_image(&self, ticket: &Ticket, request: &RenderRequest) -> Result<ImageReply> {
        let response = self
            .authorized(self.client.get(self.url("api/component/render/image")), ticket)
            .query(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport)?.to_vec();

        Ok(ImageReply { status, content_type, bytes })
    }
}
