use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Unknown endpoint '{0}' (use --list to see available endpoints)")]
    UnknownEndpoint(String),
    #[error("Cannot reach {url}: {reason}")]
    Connection { url: String, reason: String },
    #[error("Request failed: {status} {reason}\n{url}{}", format_body(.body))]
    Remote {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Invalid API document: {0}")]
    ApiDoc(String),
    #[error("{0}")]
    Payload(String),
    #[error("Config error: {0}")]
    Config(String),
}

fn format_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!("\n{}", body)
    }
}

impl ControlError {
    pub fn connection(url: &str, err: impl std::fmt::Display) -> Self {
        ControlError::Connection {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    /// Process exit status for this failure. Clap already owns 2 for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            ControlError::UnknownEndpoint(_) => 3,
            ControlError::Connection { .. } => 4,
            ControlError::Remote { .. } => 5,
            ControlError::Auth(_)
            | ControlError::ApiDoc(_)
            | ControlError::Payload(_)
            | ControlError::Config(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_surfaces_body_verbatim() {
        let err = ControlError::Remote {
            status: 404,
            reason: "Not Found".to_string(),
            url: "http://localhost:26538/api/v1/nope".to_string(),
            body: "{\"error\":\"no such song\"}\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request failed: 404 Not Found\nhttp://localhost:26538/api/v1/nope\n{\"error\":\"no such song\"}"
        );
    }

    #[test]
    fn remote_error_without_body() {
        let err = ControlError::Remote {
            status: 500,
            reason: "Internal Server Error".to_string(),
            url: "http://h/x".to_string(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "Request failed: 500 Internal Server Error\nhttp://h/x");
    }

    #[test]
    fn every_failure_kind_exits_non_zero() {
        let errors = [
            ControlError::UnknownEndpoint("x".into()),
            ControlError::connection("http://h", "refused"),
            ControlError::Auth("no token".into()),
            ControlError::Payload("bad".into()),
        ];
        for err in &errors {
            assert_ne!(err.exit_code(), 0);
        }
        assert_eq!(errors[0].exit_code(), 3);
        assert_eq!(errors[1].exit_code(), 4);
    }
}
