use tracing::debug;

use crate::client::{Client, Response};
use crate::config::Settings;
use crate::endpoint::{Endpoint, Method, Registry};
use crate::error::ControlError;
use crate::payload;

/// One call as requested on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub data: Option<String>,
    /// Forced by `--patch` / `--delete`.
    pub method: Option<Method>,
}

impl Invocation {
    pub fn new(name: impl Into<String>, data: Option<String>) -> Self {
        Invocation {
            name: name.into(),
            data,
            method: None,
        }
    }
}

pub struct Dispatcher {
    client: Client,
    user: String,
}

impl Dispatcher {
    pub fn new(settings: &Settings) -> Self {
        Dispatcher {
            client: Client::new(settings),
            user: settings.user.clone(),
        }
    }

    pub fn registry(&self) -> Result<Registry, ControlError> {
        let doc = self.client.fetch_doc()?;
        debug!("API document: {}", doc);
        Registry::from_doc(&doc, self.client.api_prefix())
    }

    pub fn list_endpoints(&self) -> Result<Vec<Endpoint>, ControlError> {
        Ok(self.registry()?.endpoints().to_vec())
    }

    pub fn invoke(&self, name: &str, data: Option<&str>) -> Result<Response, ControlError> {
        self.dispatch(&Invocation::new(name, data.map(str::to_string)))
    }

    pub fn dispatch(&self, invocation: &Invocation) -> Result<Response, ControlError> {
        let name = invocation.name.trim_matches('/');
        if name.is_empty() {
            return Err(ControlError::UnknownEndpoint(invocation.name.clone()));
        }

        let registry = self.registry()?;
        let endpoint = registry
            .resolve(name)
            .ok_or_else(|| ControlError::UnknownEndpoint(name.to_string()))?;

        let method = select_method(endpoint, invocation.data.is_some(), invocation.method);
        let payload = match &invocation.data {
            Some(data) if method.takes_data() => {
                Some(payload::shape(name, data, endpoint.operation(method))?)
            }
            Some(_) => {
                debug!("{} {} takes no data, ignoring it", method, name);
                None
            }
            None => None,
        };

        let token = self.client.authenticate(&self.user)?;
        self.client.call(&token, name, method, payload.as_ref())
    }
}

/// Forced method first, then POST when data is given, then GET when the
/// endpoint supports it, then whatever the endpoint documents first.
pub fn select_method(endpoint: &Endpoint, has_data: bool, forced: Option<Method>) -> Method {
    if let Some(method) = forced {
        return method;
    }
    if has_data {
        return Method::Post;
    }
    if endpoint.operation(Method::Get).is_some() {
        return Method::Get;
    }
    endpoint
        .operations
        .first()
        .map(|op| op.method)
        .unwrap_or(Method::Get)
}
