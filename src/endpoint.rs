use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn from_doc_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(Method::Get),
            "post" => Some(Method::Post),
            "put" => Some(Method::Put),
            "patch" => Some(Method::Patch),
            "delete" => Some(Method::Delete),
            "head" => Some(Method::Head),
            "options" => Some(Method::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Methods whose request carries user data.
    pub fn takes_data(&self) -> bool {
        matches!(self, Method::Post | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: Method,
    pub description: String,
    /// Human description of the expected request body.
    pub data: Option<String>,
    /// JSON schema of the request body, opaque outside of payload shaping.
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub name: String,
    pub operations: Vec<Operation>,
}

impl Endpoint {
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        self.operations.iter().find(|op| op.method == method)
    }

    /// Whether a concrete name such as `queue/3` matches this endpoint,
    /// treating `{param}` segments as wildcards.
    pub fn matches(&self, name: &str) -> bool {
        if self.name == name {
            return true;
        }
        let pattern: Vec<&str> = self.name.split('/').collect();
        let given: Vec<&str> = name.split('/').collect();
        pattern.len() == given.len()
            && pattern.iter().zip(&given).all(|(p, g)| {
                if p.starts_with('{') && p.ends_with('}') {
                    !g.is_empty()
                } else {
                    p == g
                }
            })
    }

    fn upsert(&mut self, operation: Operation) {
        match self.operations.iter_mut().find(|op| op.method == operation.method) {
            Some(existing) => *existing = operation,
            None => self.operations.push(operation),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiDoc {
    #[serde(default)]
    paths: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
struct OperationDoc {
    description: Option<String>,
    #[serde(rename = "requestBody")]
    request_body: Option<RequestBodyDoc>,
}

#[derive(Debug, Deserialize)]
struct RequestBodyDoc {
    description: Option<String>,
    #[serde(default)]
    content: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    endpoints: Vec<Endpoint>,
}

impl Registry {
    /// Builds the registry from the body of `GET /doc`, keeping only paths
    /// under `api_prefix`.
    pub fn from_doc(body: &str, api_prefix: &str) -> Result<Self, ControlError> {
        let doc: ApiDoc =
            serde_json::from_str(body).map_err(|e| ControlError::ApiDoc(e.to_string()))?;
        let mut registry = Registry::default();

        for (path, methods) in &doc.paths {
            let Some(name) = endpoint_name(path, api_prefix) else {
                continue;
            };
            let Value::Object(methods) = methods else {
                continue;
            };

            for (key, details) in methods {
                // Path items may also carry `parameters`, `summary`, ...
                let Some(method) = Method::from_doc_key(key) else {
                    continue;
                };
                let op: OperationDoc = serde_json::from_value(details.clone()).map_err(|e| {
                    ControlError::ApiDoc(format!("{} {}: {}", method, path, e))
                })?;
                registry.insert(name, build_operation(method, name, op));
            }
        }

        Ok(registry)
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.name == name)
    }

    /// Exact names win over templated ones.
    pub fn resolve(&self, name: &str) -> Option<&Endpoint> {
        self.get(name)
            .or_else(|| self.endpoints.iter().find(|ep| ep.matches(name)))
    }

    fn insert(&mut self, name: &str, operation: Operation) {
        match self.endpoints.iter_mut().find(|ep| ep.name == name) {
            Some(endpoint) => endpoint.upsert(operation),
            None => self.endpoints.push(Endpoint {
                name: name.to_string(),
                operations: vec![operation],
            }),
        }
    }
}

fn endpoint_name<'a>(path: &'a str, api_prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(api_prefix)?;
    if !(rest.is_empty() || rest.starts_with('/') || api_prefix.ends_with('/')) {
        return None;
    }
    if path.ends_with("-info") {
        return None;
    }
    let name = rest.trim_matches('/');
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn build_operation(method: Method, name: &str, doc: OperationDoc) -> Operation {
    let mut data = None;
    let mut schema = None;

    if method.takes_data() {
        if let Some(body) = doc.request_body {
            data = Some(body.description.unwrap_or_else(|| "no description".to_string()));
            schema = body.content.get("application/json").map(|json| {
                json.get("schema").cloned().unwrap_or_else(|| Value::Object(Map::new()))
            });
        }
    }

    Operation {
        method,
        description: doc.description.unwrap_or_else(|| name.to_string()),
        data,
        schema,
    }
}
