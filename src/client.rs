use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use ureq::http::StatusCode;
use ureq::Agent;

use crate::config::Settings;
use crate::endpoint::Method;
use crate::error::ControlError;
use crate::payload::Payload;

/// Status and raw body of a call, exactly as the server sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub method: Method,
    pub url: String,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

pub struct Client {
    agent: Agent,
    server: String,
    api: String,
}

pub fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl Client {
    pub fn new(settings: &Settings) -> Self {
        Client {
            agent: build_agent(settings.timeout),
            server: settings.server.clone(),
            api: settings.api.clone(),
        }
    }

    pub fn api_prefix(&self) -> &str {
        &self.api
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}/{}", self.server, self.api, endpoint)
    }

    /// Body of the OpenAPI document served at `/doc`.
    pub fn fetch_doc(&self) -> Result<String, ControlError> {
        let url = format!("{}/doc", self.server);
        let response = self.send(Method::Get, &url, None, None)?;
        into_success(response).map(|response| response.body)
    }

    pub fn authenticate(&self, user: &str) -> Result<String, ControlError> {
        let url = format!("{}/auth/{}", self.server, percent_encode(user));
        let response = into_success(self.send(Method::Post, &url, None, None)?)?;

        let auth: AuthResponse = serde_json::from_str(&response.body)
            .map_err(|e| ControlError::Auth(format!("unexpected response from {}: {}", url, e)))?;
        auth.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ControlError::Auth(format!("no access token returned by {}", url)))
    }

    /// Calls `endpoint` and fails with `ControlError::Remote` on a non-2xx status.
    pub fn call(
        &self,
        token: &str,
        endpoint: &str,
        method: Method,
        payload: Option<&Payload>,
    ) -> Result<Response, ControlError> {
        let url = self.endpoint_url(endpoint);
        let response = self.send(method, &url, Some(token), payload)?;
        into_success(response)
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        payload: Option<&Payload>,
    ) -> Result<Response, ControlError> {
        let body = payload.map(Payload::body);
        if let Some(body) = &body {
            debug!("{} {} payload: {}", method, url, body);
        }

        let auth = token.map(|token| format!("Bearer {}", token));
        let result = match method {
            Method::Get | Method::Delete | Method::Head | Method::Options => {
                let mut request = match method {
                    Method::Get => self.agent.get(url),
                    Method::Delete => self.agent.delete(url),
                    Method::Head => self.agent.head(url),
                    _ => self.agent.options(url),
                };
                if let Some(auth) = &auth {
                    request = request.header("Authorization", auth);
                }
                request.call()
            }
            Method::Post | Method::Put | Method::Patch => {
                let mut request = match method {
                    Method::Post => self.agent.post(url),
                    Method::Put => self.agent.put(url),
                    _ => self.agent.patch(url),
                };
                if let Some(auth) = &auth {
                    request = request.header("Authorization", auth);
                }
                match &body {
                    Some(body) => request
                        .header("Content-Type", "application/json")
                        .send(body.as_str()),
                    None => request.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ControlError::connection(url, e))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ControlError::connection(url, e))?;
        debug!("{} {} {}", method, url, status);

        Ok(Response {
            method,
            url: url.to_string(),
            status,
            body,
        })
    }
}

/// Encodes one path segment, leaving only RFC 3986 unreserved bytes as is.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn into_success(response: Response) -> Result<Response, ControlError> {
    if (200..300).contains(&response.status) {
        return Ok(response);
    }
    let reason = StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
        .to_string();
    Err(ControlError::Remote {
        status: response.status,
        reason,
        url: response.url,
        body: response.body,
    })
}
